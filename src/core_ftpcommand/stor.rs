use crate::constants::FILE_STATUS_OK;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::type_::TransferType;
use crate::core_network::with_deadline;
use crate::session::{Requirement, Session, SessionState};
use log::{debug, error, info};
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

fn local_io(path: &Path) -> impl FnOnce(io::Error) -> FtpError + '_ {
    move |source| FtpError::LocalIo {
        path: path.display().to_string(),
        source,
    }
}

/// Remote name used for an upload: the final component of the local path.
pub fn remote_name(path: &Path) -> FtpResult<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            local_io(path)(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path has no usable file name",
            ))
        })
}

/// Copies exactly `size` bytes from `source` into `sink` and flushes it.
///
/// Local read failures become [`FtpError::LocalIo`], write failures on the
/// data connection become [`FtpError::Connection`].
pub async fn copy_to_data<R, W>(
    source: &mut R,
    sink: &mut W,
    size: u64,
    buffer_size: usize,
    timeout: Duration,
    path: &Path,
) -> FtpResult<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut written = 0u64;

    while written < size {
        let chunk = (size - written).min(buffer.len() as u64) as usize;
        let n = source
            .read(&mut buffer[..chunk])
            .await
            .map_err(local_io(path))?;
        if n == 0 {
            return Err(local_io(path)(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shrank to {} of {} bytes during upload", written, size),
            )));
        }
        with_deadline(
            timeout,
            "writing data connection",
            sink.write_all(&buffer[..n]),
        )
        .await?;
        written += n as u64;
    }

    with_deadline(timeout, "flushing data connection", sink.flush()).await?;
    Ok(written)
}

impl Session {
    /// Uploads a local file under its own file name.
    ///
    /// Sends `TYPE I`, opens a passive data connection, then opens the local
    /// file and sends `STOR`. All bytes are written and flushed, the data
    /// connection is closed, and only then is the 226 read. The server sends it
    /// after seeing the close.
    ///
    /// # Arguments
    ///
    /// * `local_path` - The file to send. Its final path component becomes the
    ///   remote name.
    ///
    /// # Returns
    ///
    /// The number of bytes written. Fails with [`FtpError::LocalIo`] if the file
    /// cannot be opened or read, and with [`FtpError::Connection`] if the data
    /// connection breaks, which also closes the session.
    pub async fn upload(&mut self, local_path: impl AsRef<Path>) -> FtpResult<u64> {
        let path = local_path.as_ref();
        self.begin(Requirement::LoggedIn)?;
        info!("Uploading {}", path.display());
        let result = self.upload_exchange(path).await;
        self.settle(result, SessionState::Idle, SessionState::Idle)
    }

    async fn upload_exchange(&mut self, path: &Path) -> FtpResult<u64> {
        let name = remote_name(path)?;
        self.set_transfer_type(TransferType::Binary).await?;
        self.open_data_connection().await?;

        let mut file = File::open(path).await.map_err(local_io(path))?;
        let size = file.metadata().await.map_err(local_io(path))?.len();
        debug!("{} is {} bytes", path.display(), size);

        let command = format!("STOR {}", name);
        self.exchange(Some(FILE_STATUS_OK), &command).await?;

        let buffer_size = self.config.upload_buffer_size;
        let timeout = self.config.io_timeout();
        let copied = copy_to_data(
            &mut file,
            self.data_stream()?,
            size,
            buffer_size,
            timeout,
            path,
        )
        .await;

        // A broken data connection ends the session; there is no point
        // waiting for a reply on the control side.
        if let Err(e @ FtpError::Connection(_)) = copied {
            error!("Data connection failed during upload of {}: {}", name, e);
            return Err(e);
        }

        self.close_data_connection().await?;
        let completion = self.read_completion(&command).await;
        let written = copied?;
        completion?;

        info!("File stored successfully: {} ({} bytes)", name, written);
        Ok(written)
    }
}
