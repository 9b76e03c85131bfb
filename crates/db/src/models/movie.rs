//! Movie entity model, its two join-table associations, and DTOs.
//!
//! A movie is loaded either alone ([`Movie`]) or together with its
//! association rows ([`MovieAggregate`]). The full-replace path needs the
//! aggregate because it swaps the association sets wholesale; list, patch
//! and delete only ever touch the `movies` row.

use filmoteca_core::associations::Association;
use filmoteca_core::patch::{decode, encode, FieldError, Patchable};
use filmoteca_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use super::genre::GenreDto;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A movie row from the `movies` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Movie {
    pub id: DbId,
    pub title: String,
    pub release_date: Option<Date>,
    pub summary: Option<String>,
    /// Blob reference of the stored poster.
    pub poster: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A `movies_genres` row. The movie id is implied by the owning movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct MovieGenre {
    pub genre_id: DbId,
}

impl Association for MovieGenre {
    type Key = DbId;

    fn key(&self) -> DbId {
        self.genre_id
    }
}

/// A `movies_actors` row. The movie id is implied by the owning movie.
///
/// `order` is `None` until [`crate::mapping::assign_cast_order`] runs; it is
/// always derived from position, never taken from client input.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MovieActor {
    pub actor_id: DbId,
    #[sqlx(rename = "character_name")]
    pub character: String,
    #[sqlx(rename = "sort_order")]
    pub order: Option<i32>,
}

impl Association for MovieActor {
    type Key = DbId;

    fn key(&self) -> DbId {
        self.actor_id
    }
}

/// A movie together with its association rows, cast in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieAggregate {
    pub movie: Movie,
    pub genres: Vec<MovieGenre>,
    pub actors: Vec<MovieActor>,
}

/// A movie (plus associations) that has not been inserted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub release_date: Option<Date>,
    pub summary: Option<String>,
    pub poster: Option<String>,
    pub genres: Vec<MovieGenre>,
    pub actors: Vec<MovieActor>,
}

/// Cast member joined with the actor's name, for read DTOs.
#[derive(Debug, Clone, FromRow)]
pub struct CastCredit {
    pub actor_id: DbId,
    pub name: String,
    pub character_name: String,
    pub sort_order: i32,
}

// ---------------------------------------------------------------------------
// Input DTOs
// ---------------------------------------------------------------------------

/// One cast entry submitted with a movie form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorCredit {
    pub actor_id: DbId,
    #[serde(default)]
    pub character: String,
}

/// Scalar and association fields of the movie create/replace form. The
/// poster travels separately as a file part.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MovieForm {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub release_date: Option<Date>,
    pub summary: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<DbId>,
    #[serde(default)]
    pub actors: Vec<ActorCredit>,
}

// ---------------------------------------------------------------------------
// Read DTOs
// ---------------------------------------------------------------------------

/// List shape: scalar fields only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummaryDto {
    pub id: DbId,
    pub title: String,
    pub release_date: Option<Date>,
    pub summary: Option<String>,
    pub poster: Option<String>,
}

/// Cast entry nested inside [`MovieDetailDto`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMemberDto {
    pub actor_id: DbId,
    pub name: String,
    pub character: String,
    pub order: i32,
}

/// Detail shape: scalar fields plus simplified associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetailDto {
    #[serde(flatten)]
    pub movie: MovieSummaryDto,
    pub genres: Vec<GenreDto>,
    pub actors: Vec<CastMemberDto>,
}

// ---------------------------------------------------------------------------
// Patch DTO
// ---------------------------------------------------------------------------

/// Patchable subset of a movie. Associations and poster are not reachable
/// through a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoviePatchDto {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub release_date: Option<Date>,
    pub summary: Option<String>,
}

impl Patchable for MoviePatchDto {
    const FIELDS: &'static [&'static str] = &["title", "releaseDate", "summary"];

    fn get_field(&self, field: &str) -> Result<Value, FieldError> {
        match field {
            "title" => encode(&self.title),
            "releaseDate" => encode(&self.release_date),
            "summary" => encode(&self.summary),
            _ => Err(FieldError::Unknown),
        }
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "title" => self.title = decode(value)?,
            "releaseDate" => self.release_date = decode(value)?,
            "summary" => self.summary = decode(value)?,
            _ => return Err(FieldError::Unknown),
        }
        Ok(())
    }

    fn clear_field(&mut self, field: &str) -> Result<(), FieldError> {
        match field {
            "title" => self.title.clear(),
            "releaseDate" => self.release_date = None,
            "summary" => self.summary = None,
            _ => return Err(FieldError::Unknown),
        }
        Ok(())
    }
}
