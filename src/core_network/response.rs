use crate::constants::MAX_LINE_LENGTH;
use crate::core_error::{FtpError, FtpResult};
use log::trace;
use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// One logical reply read from the control connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: u16,
    pub message: String,
}

impl Response {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// 1xx replies announce that more is coming on the same exchange.
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// Separator following the three digit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Final,
    Continued,
}

/// Splits `DDD<sep>text` into its parts. Returns `None` for anything that is
/// not a reply line.
fn split_reply_line(line: &str) -> Option<(u16, Separator, &str)> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return None;
    }
    if !(b'1'..=b'5').contains(&bytes[0]) {
        return None;
    }
    let code: u16 = line[..3].parse().ok()?;

    match bytes.get(3) {
        None => Some((code, Separator::Final, "")),
        Some(b' ') => Some((code, Separator::Final, &line[4..])),
        Some(b'-') => Some((code, Separator::Continued, &line[4..])),
        Some(_) => None,
    }
}

/// Parses a single-line reply such as `226 Transfer complete.`.
pub fn parse_reply_line(line: &str) -> FtpResult<Response> {
    let line = line.trim_end_matches(['\r', '\n']);
    match split_reply_line(line) {
        Some((code, Separator::Final, text)) => Ok(Response::new(code, text.trim())),
        _ => Err(FtpError::Protocol(format!("invalid reply line: {:?}", line))),
    }
}

/// Reads one raw line, terminator stripped. A line cut short by end-of-stream
/// is reported as a closed connection, one longer than [`MAX_LINE_LENGTH`] as a
/// protocol error.
async fn read_raw_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> FtpResult<String>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut limited = (&mut *reader).take(MAX_LINE_LENGTH as u64);
    let n = limited
        .read_until(b'\n', buf)
        .await
        .map_err(FtpError::Connection)?;
    if n == MAX_LINE_LENGTH && buf.last() != Some(&b'\n') {
        return Err(FtpError::Protocol(format!(
            "reply line longer than {} bytes",
            MAX_LINE_LENGTH
        )));
    }
    if n == 0 || buf.last() != Some(&b'\n') {
        return Err(FtpError::connection_closed("reading reply"));
    }

    let line = String::from_utf8_lossy(buf);
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Reads one logical reply, single-line or multi-line.
///
/// For a multi-line reply every line body is kept, joined with `\n`. Continuation
/// lines that repeat the `DDD-` prefix have it removed.
pub async fn read_response<R>(reader: &mut R) -> FtpResult<Response>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(256);
    let first = read_raw_line(reader, &mut buf).await?;
    trace!("<- {}", first);

    let (code, separator, text) = split_reply_line(&first)
        .ok_or_else(|| FtpError::Protocol(format!("invalid reply line: {:?}", first)))?;

    if separator == Separator::Final {
        return Ok(Response::new(code, text.trim()));
    }

    let mut lines = vec![text.trim().to_string()];
    loop {
        let line = read_raw_line(reader, &mut buf).await?;
        trace!("<- {}", line);
        match split_reply_line(&line) {
            Some((c, Separator::Final, text)) if c == code => {
                lines.push(text.trim().to_string());
                break;
            }
            Some((c, Separator::Continued, text)) if c == code => {
                lines.push(text.trim().to_string());
            }
            _ => lines.push(line.trim().to_string()),
        }
    }

    Ok(Response::new(code, lines.join("\n")))
}
