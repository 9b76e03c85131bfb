//! Genre entity model and DTOs.

use filmoteca_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A genre row from the `genres` table.
#[derive(Debug, Clone, FromRow)]
pub struct Genre {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or renaming a genre.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGenre {
    #[validate(length(min = 1, max = 40))]
    pub name: String,
}

/// Read shape for a genre, also used when nested inside a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDto {
    pub id: DbId,
    pub name: String,
}
