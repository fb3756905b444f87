use crate::constants::FILE_ACTION_OK;
use crate::core_error::FtpResult;
use crate::core_network::response::Response;
use crate::session::{Requirement, Session, SessionState};
use log::info;

impl Session {
    /// Changes the remote working directory. Expects 250.
    pub async fn cwd(&mut self, path: &str) -> FtpResult<Response> {
        self.begin(Requirement::LoggedIn)?;
        let result = self
            .exchange(Some(FILE_ACTION_OK), &format!("CWD {}", path))
            .await;
        if result.is_ok() {
            info!("Directory successfully changed to: {}", path);
        }
        self.settle(result, SessionState::Idle, SessionState::Idle)
    }
}
