use crate::constants::{LOGGED_IN, NEED_PASSWORD};
use crate::core_error::{FtpError, FtpResult};
use crate::core_network::response::Response;
use crate::session::{Credentials, Requirement, Session, SessionState};
use log::{info, warn};

impl Session {
    /// Logs in with `USER` then `PASS`.
    ///
    /// A server that accepts the user without a password (230 to `USER`) skips
    /// the second step. The password never reaches the log.
    ///
    /// # Arguments
    ///
    /// * `credentials` - The user name and password to send.
    ///
    /// # Returns
    ///
    /// The 230 reply. Any other code surfaces as [`FtpError::Authentication`]
    /// and the session stays `Connected`, so listings and transfers keep failing
    /// with [`FtpError::NotLoggedIn`].
    pub async fn login(&mut self, credentials: &Credentials) -> FtpResult<Response> {
        self.begin(Requirement::Connected)?;
        info!("Logging in as {}", credentials.username);

        let result = self.login_exchange(credentials).await;
        if let Err(e) = &result {
            warn!("Login failed for {}: {}", credentials.username, e);
        }
        self.settle(result, SessionState::Authenticated, SessionState::Connected)
    }

    async fn login_exchange(&mut self, credentials: &Credentials) -> FtpResult<Response> {
        let response = self
            .exchange(None, &format!("USER {}", credentials.username))
            .await?;
        match response.code {
            LOGGED_IN => return Ok(response),
            NEED_PASSWORD => {}
            code => {
                return Err(FtpError::Authentication {
                    code,
                    message: response.message,
                })
            }
        }

        let response = self
            .exchange(None, &format!("PASS {}", credentials.password))
            .await?;
        if response.code != LOGGED_IN {
            return Err(FtpError::Authentication {
                code: response.code,
                message: response.message,
            });
        }

        info!("User {} logged in", credentials.username);
        Ok(response)
    }
}
