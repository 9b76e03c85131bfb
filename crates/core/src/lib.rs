//! Domain primitives shared by the persistence and HTTP layers.
//!
//! Nothing in this crate talks to the database. File storage is the only
//! I/O performed here.

pub mod associations;
pub mod error;
pub mod patch;
pub mod storage;
pub mod types;
