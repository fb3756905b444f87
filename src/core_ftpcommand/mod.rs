// Client side of each FTP command the session issues
pub mod cdup;
pub mod cwd;
pub mod list;
pub mod pwd;
pub mod quit;
pub mod retr;
pub mod size;
pub mod stor;
pub mod type_;
pub mod user;

pub mod site;
