//! Actor entity model and DTOs.

use filmoteca_core::patch::{decode, encode, FieldError, Patchable};
use filmoteca_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

/// An actor row from the `actors` table.
#[derive(Debug, Clone, FromRow)]
pub struct Actor {
    pub id: DbId,
    pub name: String,
    pub date_of_birth: Option<Date>,
    /// Blob reference of the stored photo.
    pub photo: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An actor that has not been inserted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActor {
    pub name: String,
    pub date_of_birth: Option<Date>,
    pub photo: Option<String>,
}

/// Scalar fields of the actor create/replace form. The photo travels
/// separately as a file part.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActorForm {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub date_of_birth: Option<Date>,
}

/// Read shape for an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDto {
    pub id: DbId,
    pub name: String,
    pub date_of_birth: Option<Date>,
    pub photo: Option<String>,
}

/// Patchable subset of an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActorPatchDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub date_of_birth: Option<Date>,
}

impl Patchable for ActorPatchDto {
    const FIELDS: &'static [&'static str] = &["name", "dateOfBirth"];

    fn get_field(&self, field: &str) -> Result<Value, FieldError> {
        match field {
            "name" => encode(&self.name),
            "dateOfBirth" => encode(&self.date_of_birth),
            _ => Err(FieldError::Unknown),
        }
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "name" => self.name = decode(value)?,
            "dateOfBirth" => self.date_of_birth = decode(value)?,
            _ => return Err(FieldError::Unknown),
        }
        Ok(())
    }

    fn clear_field(&mut self, field: &str) -> Result<(), FieldError> {
        match field {
            "name" => self.name.clear(),
            "dateOfBirth" => self.date_of_birth = None,
            _ => return Err(FieldError::Unknown),
        }
        Ok(())
    }
}
