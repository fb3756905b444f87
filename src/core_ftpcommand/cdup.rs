use crate::constants::FILE_ACTION_OK;
use crate::core_error::FtpResult;
use crate::core_network::response::Response;
use crate::session::{Requirement, Session, SessionState};

impl Session {
    /// Moves to the parent of the remote working directory. Expects 250.
    pub async fn cdup(&mut self) -> FtpResult<Response> {
        self.begin(Requirement::LoggedIn)?;
        let result = self.exchange(Some(FILE_ACTION_OK), "CDUP").await;
        self.settle(result, SessionState::Idle, SessionState::Idle)
    }
}
