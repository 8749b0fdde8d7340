pub mod extract;
pub mod init;
pub mod lint;
pub mod watch;
