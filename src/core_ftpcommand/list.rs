use crate::constants::{FILE_STATUS_OK, MAX_LINE_LENGTH};
use crate::core_error::{FtpError, FtpResult};
use crate::core_network::with_deadline;
use crate::session::{Requirement, Session, SessionState};
use chrono::{Month, NaiveDate, NaiveTime};
use log::{debug, info, trace};
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

/// Minimum tokens of an `ls -l` line: permissions, links, owner, group, size,
/// month, day, time-or-year, name.
const MIN_LIST_FIELDS: usize = 9;
const MONTH_FIELD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Link,
}

impl EntryKind {
    fn from_permissions(permissions: &str) -> Self {
        match permissions.chars().next() {
            Some('d') => EntryKind::Directory,
            Some('l') => EntryKind::Link,
            _ => EntryKind::File,
        }
    }
}

/// One line of a `LIST` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub kind: EntryKind,
    pub name: String,
    pub permissions: String,
    /// The three timestamp tokens as sent, e.g. `Jan 15 10:30`.
    pub modified: String,
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:>12} {}", self.permissions, self.modified, self.name)
    }
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn modified_time(&self) -> Option<ListingTime> {
        parse_listing_time(&self.modified)
    }
}

/// Timestamp of a listing entry.
///
/// `ls -l` prints `Mon DD HH:MM` for recent files and leaves the year out;
/// such entries stay year-less here rather than being guessed into a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingTime {
    Recent { month: u32, day: u32, time: NaiveTime },
    Dated(NaiveDate),
}

/// Parses `Mon DD HH:MM` or `Mon DD YYYY`.
pub fn parse_listing_time(text: &str) -> Option<ListingTime> {
    let mut tokens = text.split_whitespace();
    let month = tokens.next()?.parse::<Month>().ok()?.number_from_month();
    let day = tokens.next()?.parse::<u32>().ok()?;
    let last = tokens.next()?;
    if tokens.next().is_some() || !(1..=31).contains(&day) {
        return None;
    }

    if last.contains(':') {
        let time = NaiveTime::parse_from_str(last, "%H:%M").ok()?;
        Some(ListingTime::Recent { month, day, time })
    } else {
        let year = last.parse::<i32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day).map(ListingTime::Dated)
    }
}

/// Turns one `ls -l` line into an entry, or `None` if it is too short
/// (`total 8`, blank lines).
///
/// The name is the last token, so names containing spaces come back
/// truncated and a link shows its target.
pub fn parse_list_line(line: &str) -> Option<DirectoryEntry> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_LIST_FIELDS {
        return None;
    }

    let permissions = fields[0];
    Some(DirectoryEntry {
        kind: EntryKind::from_permissions(permissions),
        name: fields[fields.len() - 1].to_string(),
        permissions: permissions.to_string(),
        modified: fields[MONTH_FIELD..MONTH_FIELD + 3].join(" "),
    })
}

/// Reads listing lines until end-of-stream.
pub async fn read_listing<R>(reader: &mut R, timeout: Duration) -> FtpResult<Vec<DirectoryEntry>>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut entries = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let mut limited = (&mut reader).take(MAX_LINE_LENGTH as u64);
        let n = with_deadline(
            timeout,
            "reading listing",
            limited.read_until(b'\n', &mut buf),
        )
        .await?;
        if n == 0 {
            break;
        }
        if n == MAX_LINE_LENGTH && buf.last() != Some(&b'\n') {
            return Err(FtpError::Protocol(format!(
                "listing line longer than {} bytes",
                MAX_LINE_LENGTH
            )));
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        match parse_list_line(line) {
            Some(entry) => entries.push(entry),
            None => trace!("Skipping listing line: {:?}", line),
        }
    }

    Ok(entries)
}

impl Session {
    /// Lists the remote working directory.
    ///
    /// Opens a passive data connection, sends `LIST` and reads `ls -l` lines
    /// until the server closes the stream. Lines too short to be an entry, such
    /// as `total 8`, are skipped.
    ///
    /// # Returns
    ///
    /// The parsed entries in server order. Fails with [`FtpError::Protocol`]
    /// when the completion reply is not 226 or a line exceeds the length limit;
    /// the completion reply is consumed either way.
    pub async fn list(&mut self) -> FtpResult<Vec<DirectoryEntry>> {
        self.begin(Requirement::LoggedIn)?;
        let result = self.list_exchange().await;
        self.settle(result, SessionState::Idle, SessionState::Idle)
    }

    async fn list_exchange(&mut self) -> FtpResult<Vec<DirectoryEntry>> {
        self.open_data_connection().await?;
        self.exchange(Some(FILE_STATUS_OK), "LIST").await?;

        let timeout = self.config.io_timeout();
        let listing = read_listing(self.data_stream()?, timeout).await;
        if let Err(e @ FtpError::Connection(_)) = listing {
            return Err(e);
        }
        if let Err(e) = self.close_data_connection().await {
            debug!("Ignoring error while closing data connection: {}", e);
        }

        // A listing rejected mid-stream still gets its completion reply.
        let completion = self.read_completion("LIST").await;
        let entries = listing?;
        completion?;
        info!("Listed {} entries", entries.len());
        Ok(entries)
    }
}
