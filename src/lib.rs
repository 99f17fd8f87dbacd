pub mod config;
pub mod db;
pub mod error;
pub mod grants_gov;
pub mod server;

pub(crate) mod utils;

pub use error::GrantDeskError;
