pub mod record;
pub mod destination;
pub mod severity;
pub mod format;
pub mod sink;
pub mod writer;
pub mod alert;
pub mod handler;
pub mod error;

#[cfg(feature = "aws")]
pub mod aws;

#[cfg(feature = "server")]
pub mod server;

pub mod backend;
pub mod config;
pub mod env;
pub mod init;
pub mod memory;
