//! Database open, destructive reset and table schemas

pub mod init;
pub mod schema;

pub use init::*;
pub use schema::*;
