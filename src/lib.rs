//! An asynchronous FTP client.
//!
//! One [`Session`] owns the control connection. Listings and transfers each
//! open a passive-mode data connection and close it before returning.
//!
//! ```no_run
//! use rouilleftp::{ClientConfig, Credentials, Session};
//!
//! # async fn demo() -> rouilleftp::FtpResult<()> {
//! let mut session = Session::new(ClientConfig::default());
//! session.connect().await?;
//! session.login(&Credentials::new("ftpuser", "pass")).await?;
//! for entry in session.list().await? {
//!     println!("{}", entry);
//! }
//! let bytes = session.download("file.txt").await?;
//! println!("{} bytes", bytes.len());
//! session.quit().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod core_cli;
pub mod core_error;
pub mod core_ftpcommand;
pub mod core_log;
pub mod core_network;
pub mod session;

pub use config::{ClientConfig, Config, PassiveMode};
pub use core_error::{FtpError, FtpResult};
pub use core_ftpcommand::list::{DirectoryEntry, EntryKind, ListingTime};
pub use core_network::response::Response;
pub use session::{Credentials, Session, SessionState};
