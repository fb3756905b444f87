use crate::config::PassiveMode;
use crate::constants::{EXTENDED_PASSIVE_MODE, PASSIVE_MODE};
use crate::core_error::{FtpError, FtpResult};
use crate::core_network::control::ControlChannel;
use crate::core_network::with_deadline;
use log::{debug, trace};
use regex::Regex;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// Extracts the port from an EPSV reply such as
/// `Entering Extended Passive Mode (|||52341|)`.
///
/// Only the last numeric field of the parenthesized descriptor is used. The
/// address fields are ignored because the data connection goes to the control
/// connection's peer.
pub fn parse_epsv_port(message: &str) -> FtpResult<u16> {
    let invalid = || FtpError::Protocol(format!("no port in EPSV reply: {:?}", message));

    let open = message.rfind('(').ok_or_else(invalid)?;
    let close = message[open..].find(')').ok_or_else(invalid)? + open;
    let descriptor = &message[open + 1..close];

    let delimiter = descriptor.chars().next().ok_or_else(invalid)?;
    let port = descriptor
        .split(delimiter)
        .filter(|field| !field.is_empty())
        .last()
        .and_then(|field| field.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
        .ok_or_else(invalid)?;

    trace!("Got port number from EPSV: {}", port);
    Ok(port)
}

/// Decodes the `h1,h2,h3,h4,p1,p2` tuple of a PASV reply.
pub fn parse_pasv_address(message: &str) -> FtpResult<SocketAddrV4> {
    let invalid = || FtpError::Protocol(format!("no address in PASV reply: {:?}", message));

    let re = Regex::new(r"(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3})")
        .map_err(|e| FtpError::Protocol(e.to_string()))?;
    let caps = re.captures(message).ok_or_else(invalid)?;

    let mut octets = [0u8; 6];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = caps[i + 1].parse::<u8>().map_err(|_| invalid())?;
    }

    let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = (u16::from(octets[4]) << 8) | u16::from(octets[5]);
    if port == 0 {
        return Err(invalid());
    }
    Ok(SocketAddrV4::new(ip, port))
}

/// Asks the server for a data port and returns where to dial it.
///
/// The address is good for one dial only; every transfer negotiates again.
pub async fn enter_passive_mode<S>(
    control: &mut ControlChannel<S>,
    mode: PassiveMode,
    peer: SocketAddr,
) -> FtpResult<SocketAddr>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let addr = match mode {
        PassiveMode::Extended => {
            let response = control.command(Some(EXTENDED_PASSIVE_MODE), "EPSV").await?;
            SocketAddr::new(peer.ip(), parse_epsv_port(&response.message)?)
        }
        PassiveMode::Classic => {
            let response = control.command(Some(PASSIVE_MODE), "PASV").await?;
            SocketAddr::V4(parse_pasv_address(&response.message)?)
        }
    };
    debug!("Passive data address is {}", addr);
    Ok(addr)
}

/// Dials the data connection announced by [`enter_passive_mode`].
pub async fn open_data_connection(addr: SocketAddr, timeout: Duration) -> FtpResult<TcpStream> {
    let stream = with_deadline(timeout, "dialing data connection", TcpStream::connect(addr)).await?;
    debug!("Data connection established with {}", addr);
    Ok(stream)
}
