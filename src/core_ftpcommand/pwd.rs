use crate::constants::PATH_CREATED;
use crate::core_error::FtpResult;
use crate::session::{Requirement, Session, SessionState};

/// Pulls the directory out of a 257 reply such as
/// `"/home/ftpuser" is the current directory`.
///
/// Doubled quotes inside the name stand for one quote. Without quotes the
/// whole message is returned.
pub fn parse_pwd_path(message: &str) -> String {
    let Some(start) = message.find('"') else {
        return message.trim().to_string();
    };

    let mut path = String::new();
    let mut chars = message[start + 1..].chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                path.push('"');
                continue;
            }
            return path;
        }
        path.push(c);
    }
    // Unterminated quote; take what is there.
    path
}

impl Session {
    /// Returns the remote working directory. Expects 257.
    pub async fn pwd(&mut self) -> FtpResult<String> {
        self.begin(Requirement::LoggedIn)?;
        let result = self
            .exchange(Some(PATH_CREATED), "PWD")
            .await
            .map(|response| parse_pwd_path(&response.message));
        self.settle(result, SessionState::Idle, SessionState::Idle)
    }
}
