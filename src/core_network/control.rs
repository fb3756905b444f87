use crate::constants::LINE_TERMINATOR;
use crate::core_error::{FtpError, FtpResult};
use crate::core_network::response::{read_response, Response};
use crate::core_network::with_deadline;
use log::{debug, error};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Masks secrets before a command line reaches the log.
pub fn redact(command: &str) -> &str {
    match command.get(..4) {
        Some(verb) if verb.eq_ignore_ascii_case("PASS") => "PASS ****",
        _ => command,
    }
}

/// Checks a reply against the code the command is supposed to produce.
pub fn expect_code(response: Response, command: &str, want: u16) -> FtpResult<Response> {
    if response.code == want {
        Ok(response)
    } else {
        Err(FtpError::UnexpectedReply {
            command: redact(command).to_string(),
            got: response.code,
            want,
            message: response.message,
        })
    }
}

/// The control connection: strict command/reply alternation over one stream.
///
/// Any transport failure, elapsed deadline or unparseable reply marks the
/// channel broken. A broken channel refuses further traffic.
pub struct ControlChannel<S = TcpStream> {
    reader: BufReader<S>,
    timeout: Duration,
    broken: bool,
}

impl ControlChannel<TcpStream> {
    /// Dials `address` within the deadline. The greeting is left unread.
    pub async fn connect(address: &str, timeout: Duration) -> FtpResult<Self> {
        debug!("Dialing control connection to {}", address);
        let stream = with_deadline(
            timeout,
            "dialing control connection",
            TcpStream::connect(address),
        )
        .await?;
        Ok(Self::new(stream, timeout))
    }

    pub fn get_ref(&self) -> &TcpStream {
        self.reader.get_ref()
    }
}

impl<S> ControlChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, timeout: Duration) -> Self {
        Self {
            reader: BufReader::new(stream),
            timeout,
            broken: false,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn check_usable(&self) -> FtpResult<()> {
        if self.broken {
            return Err(FtpError::SessionClosed);
        }
        Ok(())
    }

    /// Reads exactly one reply.
    pub async fn read_response(&mut self) -> FtpResult<Response> {
        self.check_usable()?;
        let result = match tokio::time::timeout(self.timeout, read_response(&mut self.reader)).await
        {
            Ok(result) => result,
            Err(_) => Err(FtpError::timed_out("waiting for reply")),
        };

        match result {
            Ok(response) => {
                debug!("<- {}", response);
                Ok(response)
            }
            Err(e) => {
                error!("Control channel read failed: {}", e);
                self.broken = true;
                Err(e)
            }
        }
    }

    /// Writes one command line. The terminator is appended here.
    ///
    /// A command carrying CR or LF is refused before anything is written:
    /// the server would read it as several commands, each with its own reply.
    pub async fn send(&mut self, command: &str) -> FtpResult<()> {
        self.check_usable()?;
        if command.contains(['\r', '\n']) {
            return Err(FtpError::Protocol(format!(
                "line break in command {:?}",
                redact(command)
            )));
        }
        debug!("-> {}", redact(command));

        let line = format!("{}{}", command, LINE_TERMINATOR);
        let stream = self.reader.get_mut();
        let result = with_deadline(self.timeout, "sending command", async {
            stream.write_all(line.as_bytes()).await?;
            stream.flush().await
        })
        .await;

        if let Err(e) = &result {
            error!("Control channel write failed: {}", e);
            self.broken = true;
        }
        result
    }

    /// Sends `command` and reads back its reply, one write then one read.
    ///
    /// With `expected` set, any other code is returned as
    /// [`FtpError::UnexpectedReply`]. The reply has been consumed either way, so
    /// the channel stays in step.
    pub async fn command(&mut self, expected: Option<u16>, command: &str) -> FtpResult<Response> {
        self.send(command).await?;
        let response = self.read_response().await?;
        match expected {
            Some(want) => expect_code(response, command, want),
            None => Ok(response),
        }
    }

    /// Best-effort shutdown of the write half.
    pub async fn shutdown(&mut self) {
        let timeout = self.timeout;
        let stream = self.reader.get_mut();
        if let Err(e) = with_deadline(timeout, "closing control connection", stream.shutdown()).await
        {
            debug!("Ignoring error while closing control connection: {}", e);
        }
        self.broken = true;
    }
}
