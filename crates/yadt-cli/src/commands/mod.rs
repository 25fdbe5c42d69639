pub mod version;
pub mod watch;
