use crate::constants::COMMAND_OK;
use crate::core_error::FtpResult;
use crate::core_network::response::Response;
use crate::session::Session;

/// Representation types the client asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Binary,
}

impl TransferType {
    pub fn command(self) -> &'static str {
        match self {
            TransferType::Ascii => "TYPE A",
            TransferType::Binary => "TYPE I",
        }
    }
}

impl Session {
    /// Sets the representation type inside an exchange that is already running.
    pub(crate) async fn set_transfer_type(&mut self, kind: TransferType) -> FtpResult<Response> {
        self.exchange(Some(COMMAND_OK), kind.command()).await
    }
}
