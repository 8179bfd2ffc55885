pub mod connection;
pub mod runs;

pub use connection::{init_db, Database};
