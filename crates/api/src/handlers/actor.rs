//! Handlers for the `/actors` resource.
//!
//! Actors mirror movies on a smaller scale: multipart create/replace with an
//! optional `photo`, and a JSON patch over `name` and `dateOfBirth`.

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::Json;
use filmoteca_core::error::CoreError;
use filmoteca_core::patch;
use filmoteca_core::storage::CONTAINER_ACTORS;
use filmoteca_core::types::DbId;
use filmoteca_db::mapping::{apply_actor_form, apply_actor_patch, new_actor};
use filmoteca_db::models::actor::{ActorDto, ActorPatchDto};
use filmoteca_db::repositories::ActorRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::form::{read_actor_form, read_patch_document};
use crate::handlers::{check_upload, discard_blob, retire_blob};
use crate::state::AppState;

const ENTITY: &str = "Actor";

/// GET /api/v1/actors
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ActorDto>>> {
    let actors = ActorRepo::list(&state.pool).await?;
    Ok(Json(actors.iter().map(ActorDto::from).collect()))
}

/// GET /api/v1/actors/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActorDto>> {
    let actor = ActorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    Ok(Json(ActorDto::from(&actor)))
}

/// POST /api/v1/actors
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<ActorDto>)> {
    let (form, photo) = read_actor_form(multipart).await?;
    form.validate()?;
    if let Some(upload) = &photo {
        check_upload(&state, upload)?;
    }

    let mut input = new_actor(&form);
    if let Some(upload) = &photo {
        let reference = state
            .files
            .store(
                &upload.bytes,
                &upload.extension(),
                CONTAINER_ACTORS,
                &upload.content_type,
            )
            .await?;
        input.photo = Some(reference);
    }

    let actor = match ActorRepo::create(&state.pool, &input).await {
        Ok(actor) => actor,
        Err(err) => {
            if let Some(reference) = &input.photo {
                discard_blob(&state, reference, CONTAINER_ACTORS).await;
            }
            return Err(err.into());
        }
    };
    tracing::info!(actor_id = actor.id, name = %actor.name, "Actor created");

    let location = format!("/api/v1/actors/{}", actor.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ActorDto::from(&actor)),
    ))
}

/// PUT /api/v1/actors/{id}
///
/// A new photo replaces the previous one only after the save commits.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<StatusCode> {
    let mut actor = ActorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    let (form, photo) = read_actor_form(multipart).await?;
    form.validate()?;
    if let Some(upload) = &photo {
        check_upload(&state, upload)?;
    }

    let previous_photo = actor.photo.clone();
    apply_actor_form(&mut actor, &form);

    let new_photo = match &photo {
        Some(upload) => Some(
            state
                .files
                .store(
                    &upload.bytes,
                    &upload.extension(),
                    CONTAINER_ACTORS,
                    &upload.content_type,
                )
                .await?,
        ),
        None => None,
    };
    if let Some(reference) = &new_photo {
        actor.photo = Some(reference.clone());
    }

    let saved = ActorRepo::save(&state.pool, &actor).await;
    if !matches!(saved, Ok(true)) {
        if let Some(reference) = &new_photo {
            discard_blob(&state, reference, CONTAINER_ACTORS).await;
        }
    }
    if !saved? {
        return Err(AppError::not_found(ENTITY, id));
    }

    if let (Some(_), Some(previous)) = (&new_photo, &previous_photo) {
        retire_blob(&state, previous, CONTAINER_ACTORS).await;
    }
    tracing::info!(actor_id = id, photo = ?new_photo, "Actor updated");

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/actors/{id}
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<StatusCode> {
    let document = read_patch_document(&body)?;

    let mut actor = ActorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    let operations = patch::parse_document(document).map_err(CoreError::from)?;
    let mut dto = ActorPatchDto::from(&actor);
    patch::apply(&mut dto, &operations).map_err(CoreError::from)?;
    dto.validate()?;

    apply_actor_patch(&mut actor, dto);
    if !ActorRepo::save(&state.pool, &actor).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    tracing::info!(actor_id = id, operations = operations.len(), "Actor patched");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/actors/{id}
///
/// Credits cascade and the remaining cast of each affected movie is
/// renumbered.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if !ActorRepo::exists(&state.pool, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }

    if ActorRepo::delete(&state.pool, id).await? {
        tracing::info!(actor_id = id, "Actor deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(ENTITY, id))
    }
}
