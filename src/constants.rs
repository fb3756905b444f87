// Reply codes the client checks for
pub const FILE_STATUS_OK: u16 = 150;
pub const COMMAND_OK: u16 = 200;
pub const FILE_STATUS: u16 = 213;
pub const SERVICE_READY: u16 = 220;
pub const SERVICE_CLOSING: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const PASSIVE_MODE: u16 = 227;
pub const EXTENDED_PASSIVE_MODE: u16 = 229;
pub const LOGGED_IN: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;
pub const PATH_CREATED: u16 = 257;
pub const NEED_PASSWORD: u16 = 331;

pub const LINE_TERMINATOR: &str = "\r\n";
// Longest reply or listing line accepted, terminator included
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

pub const DEFAULT_PORT: u16 = 21;
pub const DEFAULT_IO_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DOWNLOAD_BUFFER_SIZE: usize = 128 * 1024;
pub const DEFAULT_UPLOAD_BUFFER_SIZE: usize = 256 * 1024;
