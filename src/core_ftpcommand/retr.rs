use crate::constants::FILE_STATUS_OK;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::type_::TransferType;
use crate::core_network::with_deadline;
use crate::session::{Requirement, Session, SessionState};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Upper bound on memory reserved up front from an announced size.
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// Reads from `reader` until `want` bytes have arrived or the stream ends.
///
/// No single read is assumed to carry the whole payload. Nothing past `want`
/// is consumed. A short result is returned as-is; the caller decides what
/// end-of-stream before `want` means.
pub async fn read_announced<R>(
    reader: &mut R,
    want: u64,
    buffer_size: usize,
    timeout: Duration,
) -> FtpResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut payload = Vec::with_capacity(want.min(MAX_PREALLOCATION) as usize);
    let mut buffer = vec![0u8; buffer_size.max(1)];

    while (payload.len() as u64) < want {
        let remaining = want - payload.len() as u64;
        let chunk = remaining.min(buffer.len() as u64) as usize;
        let n = with_deadline(
            timeout,
            "reading data connection",
            reader.read(&mut buffer[..chunk]),
        )
        .await?;
        if n == 0 {
            debug!("Data connection ended after {} of {} bytes", payload.len(), want);
            break;
        }
        payload.extend_from_slice(&buffer[..n]);
    }

    Ok(payload)
}

impl Session {
    /// Downloads a remote file into memory.
    ///
    /// Sends `TYPE I`, then `SIZE` for the byte count, then opens a passive data
    /// connection and sends `RETR`. The payload is read until the announced size
    /// is reached or the server closes the stream. The data connection is closed
    /// and only then is the completion reply read from the control connection.
    ///
    /// # Arguments
    ///
    /// * `name` - The remote file name, relative to the working directory.
    ///
    /// # Returns
    ///
    /// The file contents. Fails with [`FtpError::IncompleteTransfer`] when the
    /// stream ends early, and with [`FtpError::Protocol`] when the completion
    /// reply is not 226. Both leave the session usable.
    pub async fn download(&mut self, name: &str) -> FtpResult<Vec<u8>> {
        self.begin(Requirement::LoggedIn)?;
        info!("Downloading {}", name);
        let result = self.download_exchange(name).await;
        self.settle(result, SessionState::Idle, SessionState::Idle)
    }

    async fn download_exchange(&mut self, name: &str) -> FtpResult<Vec<u8>> {
        self.set_transfer_type(TransferType::Binary).await?;
        let want = self.size_exchange(name).await?;
        debug!("{} announced as {} bytes", name, want);

        self.open_data_connection().await?;
        let command = format!("RETR {}", name);
        self.exchange(Some(FILE_STATUS_OK), &command).await?;

        let buffer_size = self.config.download_buffer_size;
        let timeout = self.config.io_timeout();
        let payload = read_announced(self.data_stream()?, want, buffer_size, timeout).await?;

        if let Err(e) = self.close_data_connection().await {
            debug!("Ignoring error while closing data connection: {}", e);
        }

        // The server always follows up on the control channel, even after a
        // short transfer. Consume that reply first to stay in step.
        let completion = self.read_completion(&command).await;
        let got = payload.len() as u64;
        if got < want {
            warn!("Transfer of {} stopped at {} of {} bytes", name, got, want);
            return Err(FtpError::IncompleteTransfer { got, want });
        }
        completion?;

        info!("Downloaded {} ({} bytes)", name, got);
        Ok(payload)
    }
}
