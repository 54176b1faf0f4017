pub mod add;
pub mod config;
pub mod db;
pub mod init;
pub mod list;
pub mod log;
pub mod start;
pub mod status;
pub mod stop;
