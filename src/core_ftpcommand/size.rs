use crate::constants::FILE_STATUS;
use crate::core_error::{FtpError, FtpResult};
use crate::session::{Requirement, Session, SessionState};

/// Reads the byte count of a 213 reply.
pub fn parse_size(message: &str) -> FtpResult<u64> {
    message
        .trim()
        .parse::<u64>()
        .map_err(|_| FtpError::Protocol(format!("invalid SIZE reply: {:?}", message)))
}

impl Session {
    /// Queries the size of a remote file. Expects 213.
    pub async fn size(&mut self, name: &str) -> FtpResult<u64> {
        self.begin(Requirement::LoggedIn)?;
        let result = self.size_exchange(name).await;
        self.settle(result, SessionState::Idle, SessionState::Idle)
    }

    pub(crate) async fn size_exchange(&mut self, name: &str) -> FtpResult<u64> {
        let response = self
            .exchange(Some(FILE_STATUS), &format!("SIZE {}", name))
            .await?;
        parse_size(&response.message)
    }
}
