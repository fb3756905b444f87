pub mod control;
pub mod passive;
pub mod response;

use crate::core_error::{FtpError, FtpResult};
use std::future::Future;
use std::io;
use std::time::Duration;

/// Runs one network step under a deadline.
pub async fn with_deadline<T, F>(limit: Duration, context: &str, step: F) -> FtpResult<T>
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(limit, step).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(FtpError::Connection(e)),
        Err(_) => Err(FtpError::timed_out(context)),
    }
}
