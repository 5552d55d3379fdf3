pub mod colors;
pub mod config;
pub mod list;
pub mod note;
pub mod views;
pub mod watch;
