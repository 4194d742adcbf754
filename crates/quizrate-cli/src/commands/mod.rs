pub mod draw;
pub mod finalize;
pub mod init;
pub mod validate;
