use crate::constants::COMMAND_OK;
use crate::core_error::FtpResult;
use crate::core_network::response::Response;
use crate::session::{Requirement, Session, SessionState};
use log::{info, warn};

/// Formats the `SITE CHMOD` line, mode in octal.
pub fn chmod_command(path: &str, mode: u32) -> String {
    format!("SITE CHMOD {:o} {}", mode, path)
}

impl Session {
    /// Changes permissions of a remote file. Expects 200.
    ///
    /// Plenty of servers do not implement `SITE CHMOD`; their refusal comes
    /// back as [`crate::FtpError::UnexpectedReply`] and is not retried.
    pub async fn chmod(&mut self, path: &str, mode: u32) -> FtpResult<Response> {
        self.begin(Requirement::LoggedIn)?;
        let result = self.exchange(Some(COMMAND_OK), &chmod_command(path, mode)).await;
        match &result {
            Ok(_) => info!("Changed permissions of {} to {:o}", path, mode),
            Err(e) => warn!("Failed to change permissions of {}: {}", path, e),
        }
        self.settle(result, SessionState::Idle, SessionState::Idle)
    }
}
