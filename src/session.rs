use crate::config::ClientConfig;
use crate::constants::{SERVICE_READY, TRANSFER_COMPLETE};
use crate::core_error::{FtpError, FtpResult};
use crate::core_network::control::ControlChannel;
use crate::core_network::passive::{enter_passive_mode, open_data_connection};
use crate::core_network::response::Response;
use crate::core_network::with_deadline;
use log::{debug, info, warn};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Where a session is in its lifecycle.
///
/// `Transferring` covers any exchange in flight. A session left there by a
/// dropped future rejects every later call with [`FtpError::SessionBusy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Authenticated,
    Idle,
    Transferring,
    Closed,
}

/// What an operation needs before it may touch the control connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Requirement {
    Connected,
    LoggedIn,
}

/// Username and password for one `login` call.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// One FTP client session: a control connection plus at most one data
/// connection, opened and closed within a single listing or transfer.
pub struct Session {
    pub(crate) config: ClientConfig,
    state: SessionState,
    control: Option<ControlChannel>,
    pub(crate) data: Option<TcpStream>,
    peer: Option<SocketAddr>,
    welcome: Option<String>,
}

impl Session {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            state: SessionState::Disconnected,
            control: None,
            data: None,
            peer: None,
            welcome: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn has_data_connection(&self) -> bool {
        self.data.is_some()
    }

    /// Greeting text sent by the server on connect.
    pub fn welcome(&self) -> Option<&str> {
        self.welcome.as_deref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Dials the control connection and waits for the 220 greeting.
    ///
    /// Any failure here leaves the session `Closed`; build a new one to retry.
    pub async fn connect(&mut self) -> FtpResult<Response> {
        match self.state {
            SessionState::Disconnected => {}
            SessionState::Closed => return Err(FtpError::SessionClosed),
            SessionState::Transferring => return Err(FtpError::SessionBusy),
            _ => {
                return Err(FtpError::Connection(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "control connection is already open",
                )))
            }
        }

        let address = self.config.address();
        info!("Connecting to {}", address);
        self.state = SessionState::Transferring;

        let result = Self::handshake(&address, &self.config).await;
        match result {
            Ok((control, peer, greeting)) => {
                info!("Connected to {}: {}", peer, greeting);
                self.control = Some(control);
                self.peer = Some(peer);
                self.welcome = Some(greeting.message.clone());
                self.state = SessionState::Connected;
                Ok(greeting)
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", address, e);
                self.release();
                Err(e)
            }
        }
    }

    async fn handshake(
        address: &str,
        config: &ClientConfig,
    ) -> FtpResult<(ControlChannel, SocketAddr, Response)> {
        let mut control = ControlChannel::connect(address, config.io_timeout()).await?;
        let peer = control.get_ref().peer_addr().map_err(FtpError::Connection)?;

        let mut greeting = control.read_response().await?;
        // 120 means "ready in a moment"; the real greeting follows.
        while greeting.code == 120 {
            debug!("Server delayed greeting: {}", greeting.message);
            greeting = control.read_response().await?;
        }

        if greeting.code != SERVICE_READY {
            return Err(FtpError::Connection(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("server not ready: {}", greeting),
            )));
        }
        Ok((control, peer, greeting))
    }

    /// Guards entry into an exchange and marks the session busy.
    /// Returns the state to fall back to.
    pub(crate) fn begin(&mut self, requirement: Requirement) -> FtpResult<SessionState> {
        let previous = self.state;
        match previous {
            SessionState::Closed => return Err(FtpError::SessionClosed),
            SessionState::Transferring => return Err(FtpError::SessionBusy),
            SessionState::Disconnected => {
                return Err(FtpError::Connection(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "control connection is not open",
                )))
            }
            SessionState::Connected if requirement == Requirement::LoggedIn => {
                return Err(FtpError::NotLoggedIn)
            }
            _ => {}
        }
        self.state = SessionState::Transferring;
        Ok(previous)
    }

    /// Ends an exchange started with [`Session::begin`].
    ///
    /// Any leftover data connection is dropped. A transport failure, or a
    /// control channel that lost its place in the reply stream, closes the
    /// session.
    pub(crate) fn settle<T>(
        &mut self,
        result: FtpResult<T>,
        on_success: SessionState,
        on_failure: SessionState,
    ) -> FtpResult<T> {
        if self.data.take().is_some() {
            debug!("Dropped leftover data connection");
        }

        match result {
            Ok(value) => {
                self.state = on_success;
                Ok(value)
            }
            Err(e) => {
                let broken = self.control.as_ref().map_or(true, |c| c.is_broken());
                if broken || matches!(e, FtpError::Connection(_)) {
                    warn!("Session closed after failure: {}", e);
                    self.release();
                } else {
                    self.state = on_failure;
                }
                Err(e)
            }
        }
    }

    /// Drops both connections and marks the session closed.
    pub(crate) fn release(&mut self) {
        self.data = None;
        self.control = None;
        self.state = SessionState::Closed;
    }

    pub(crate) fn control(&mut self) -> FtpResult<&mut ControlChannel> {
        self.control.as_mut().ok_or(FtpError::SessionClosed)
    }

    /// One command, one reply.
    pub(crate) async fn exchange(
        &mut self,
        expected: Option<u16>,
        command: &str,
    ) -> FtpResult<Response> {
        self.control()?.command(expected, command).await
    }

    /// Negotiates a passive port and dials it. Only one data connection may
    /// be open at a time.
    pub(crate) async fn open_data_connection(&mut self) -> FtpResult<()> {
        if self.data.is_some() {
            return Err(FtpError::SessionBusy);
        }
        let mode = self.config.passive_mode;
        let timeout = self.config.io_timeout();
        let peer = self.peer.ok_or(FtpError::SessionClosed)?;

        let addr = enter_passive_mode(self.control()?, mode, peer).await?;
        self.data = Some(open_data_connection(addr, timeout).await?);
        Ok(())
    }

    pub(crate) fn data_stream(&mut self) -> FtpResult<&mut TcpStream> {
        self.data.as_mut().ok_or_else(|| {
            FtpError::Connection(io::Error::new(
                io::ErrorKind::NotConnected,
                "data connection is not open",
            ))
        })
    }

    /// Flushes and closes the data connection, if one is open.
    pub(crate) async fn close_data_connection(&mut self) -> FtpResult<()> {
        let Some(mut stream) = self.data.take() else {
            return Ok(());
        };
        let timeout = self.config.io_timeout();
        let result = with_deadline(timeout, "closing data connection", stream.shutdown()).await;
        debug!("Data connection closed");
        result
    }

    /// Reads the reply that follows a closed data connection and requires 226.
    pub(crate) async fn read_completion(&mut self, command: &str) -> FtpResult<Response> {
        let response = self.control()?.read_response().await?;
        check_completion(response, command)
    }
}

/// A transfer only counts as done once the server confirms it with 226.
pub(crate) fn check_completion(response: Response, command: &str) -> FtpResult<Response> {
    if response.code == TRANSFER_COMPLETE {
        return Ok(response);
    }
    Err(FtpError::Protocol(format!(
        "{} finished with {} instead of {}",
        command, response, TRANSFER_COMPLETE
    )))
}
