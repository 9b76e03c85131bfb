//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` + `Validate` input DTOs for creates and updates
//! - `Serialize` read DTOs returned to clients
//! - A patch DTO implementing [`filmoteca_core::patch::Patchable`] where the
//!   resource supports partial updates

pub mod actor;
pub mod genre;
pub mod movie;
