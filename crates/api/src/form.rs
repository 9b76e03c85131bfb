//! Request body parsing that goes beyond a plain `Json<T>` extractor.
//!
//! - Multipart forms for the movie and actor create/replace endpoints.
//!   Scalar parts are collected into the typed form DTOs from
//!   `filmoteca_db`; the image part (if any) is returned separately as an
//!   [`Upload`] so the handler can store it before persisting. Unknown
//!   parts are ignored.
//! - Patch documents, where an absent or empty body must be a 400 rather
//!   than an extractor rejection.

use axum::body::Bytes;
use axum::extract::multipart::Field;
use axum::extract::Multipart;
use filmoteca_core::storage::file_extension;
use filmoteca_core::types::{Date, DbId};
use filmoteca_db::models::actor::ActorForm;
use filmoteca_db::models::movie::{ActorCredit, MovieForm};

use crate::error::{AppError, AppResult};

/// An uploaded file, read fully into memory.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Extension of the original filename, with leading dot.
    pub fn extension(&self) -> String {
        file_extension(&self.file_name)
    }
}

/// Read a movie create/replace form.
///
/// `genreIds` may be sent as repeated parts (one id each) or as a single
/// JSON array; `actors` as a JSON array of `{actorId, character}` or as
/// repeated parts holding one JSON object each. A `[]` suffix on either
/// name is accepted.
pub async fn read_movie_form(mut multipart: Multipart) -> AppResult<(MovieForm, Option<Upload>)> {
    let mut form = MovieForm::default();
    let mut poster = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or("").to_string();
        match name.trim_end_matches("[]") {
            "title" => form.title = text(field).await?,
            "releaseDate" => form.release_date = parse_date(&name, &text(field).await?)?,
            "summary" => form.summary = non_empty(text(field).await?),
            "genreIds" => form.genre_ids.extend(parse_ids(&name, &text(field).await?)?),
            "actors" => form.actors.extend(parse_credits(&name, &text(field).await?)?),
            "poster" => poster = upload(field).await?,
            _ => {} // ignore unknown fields
        }
    }

    Ok((form, poster))
}

/// Read an actor create/replace form (`name`, `dateOfBirth`, `photo`).
pub async fn read_actor_form(mut multipart: Multipart) -> AppResult<(ActorForm, Option<Upload>)> {
    let mut form = ActorForm::default();
    let mut photo = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" => form.name = text(field).await?,
            "dateOfBirth" => form.date_of_birth = parse_date(&name, &text(field).await?)?,
            "photo" => photo = upload(field).await?,
            _ => {} // ignore unknown fields
        }
    }

    Ok((form, photo))
}

/// Read a patch document body as raw JSON.
///
/// An empty body, `null`, or an empty array is rejected here; decoding the
/// individual operations is left to [`filmoteca_core::patch::parse_document`].
pub fn read_patch_document(body: &Bytes) -> AppResult<serde_json::Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("A patch document is required".into()));
    }
    let document: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Malformed patch document: {e}")))?;
    match &document {
        serde_json::Value::Null => Err(AppError::BadRequest("A patch document is required".into())),
        serde_json::Value::Array(ops) if ops.is_empty() => Err(AppError::BadRequest(
            "The patch document contains no operations".into(),
        )),
        _ => Ok(document),
    }
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

async fn next_field(multipart: &mut Multipart) -> AppResult<Option<Field<'_>>> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

async fn text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Read a file part. A part without a filename or with no content counts as
/// "no file supplied".
async fn upload(field: Field<'_>) -> AppResult<Option<Upload>> {
    let Some(file_name) = field.file_name().map(str::to_string) else {
        return Ok(None);
    };
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if file_name.is_empty() || bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(Upload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

// ---------------------------------------------------------------------------
// Value parsers
// ---------------------------------------------------------------------------

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_date(field: &str, value: &str) -> AppResult<Option<Date>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Date::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("'{field}' must be a YYYY-MM-DD date")))
}

fn parse_ids(field: &str, value: &str) -> AppResult<Vec<DbId>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }
    let parsed = if value.starts_with('[') {
        serde_json::from_str::<Vec<DbId>>(value).ok()
    } else {
        value.parse::<DbId>().ok().map(|id| vec![id])
    };
    parsed.ok_or_else(|| {
        AppError::BadRequest(format!("'{field}' must be an integer id or a JSON array of ids"))
    })
}

fn parse_credits(field: &str, value: &str) -> AppResult<Vec<ActorCredit>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }
    let parsed = if value.starts_with('[') {
        serde_json::from_str::<Vec<ActorCredit>>(value)
    } else {
        serde_json::from_str::<ActorCredit>(value).map(|credit| vec![credit])
    };
    parsed.map_err(|e| {
        AppError::BadRequest(format!(
            "'{field}' must be JSON {{\"actorId\", \"character\"}} entries: {e}"
        ))
    })
}
