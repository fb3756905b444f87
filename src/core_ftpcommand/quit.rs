use crate::constants::SERVICE_CLOSING;
use crate::core_error::FtpResult;
use crate::core_network::response::Response;
use crate::session::{Requirement, Session};
use log::{info, warn};

impl Session {
    /// Sends `QUIT` and releases the control connection.
    ///
    /// The write half is shut down and the socket dropped once the reply is in.
    ///
    /// # Returns
    ///
    /// The 221 reply. The session ends up `Closed` whatever the server answers.
    /// A second call fails with [`crate::FtpError::SessionClosed`] without
    /// touching the network.
    pub async fn quit(&mut self) -> FtpResult<Response> {
        self.begin(Requirement::Connected)?;
        info!("Sending QUIT. Closing connection.");

        let result = self.exchange(Some(SERVICE_CLOSING), "QUIT").await;
        if let Ok(control) = self.control() {
            control.shutdown().await;
        }
        self.release();

        match &result {
            Ok(response) => info!("Server said goodbye: {}", response.message),
            Err(e) => warn!("QUIT did not complete cleanly: {}", e),
        }
        result
    }
}
