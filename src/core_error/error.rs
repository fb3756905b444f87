// Error taxonomy for the FTP client
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("Connection error: {0}")]
    Connection(#[source] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unexpected reply to {command}: got {got}, want {want} ({message})")]
    UnexpectedReply {
        command: String,
        got: u16,
        want: u16,
        message: String,
    },

    #[error("Authentication failed: {code} {message}")]
    Authentication { code: u16, message: String },

    #[error("Incomplete transfer: received {got} of {want} bytes")]
    IncompleteTransfer { got: u64, want: u64 },

    #[error("Local I/O error on {path}: {source}")]
    LocalIo {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Session is closed")]
    SessionClosed,

    #[error("Session is busy with an unfinished exchange")]
    SessionBusy,

    #[error("Not logged in")]
    NotLoggedIn,
}

impl FtpError {
    /// Builds a connection error for a peer that hung up mid-exchange.
    pub fn connection_closed(context: &str) -> Self {
        FtpError::Connection(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("connection closed by peer while {}", context),
        ))
    }

    /// Builds a connection error for an elapsed deadline.
    pub fn timed_out(context: &str) -> Self {
        FtpError::Connection(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("deadline elapsed while {}", context),
        ))
    }

    /// Reply code carried by the error, if the server sent one.
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            FtpError::UnexpectedReply { got, .. } => Some(*got),
            FtpError::Authentication { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type FtpResult<T> = Result<T, FtpError>;
