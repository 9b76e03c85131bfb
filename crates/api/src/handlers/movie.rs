//! Handlers for the `/movies` resource.
//!
//! Create and replace take a multipart form (scalars, genre ids, cast, and
//! an optional poster file). Patch takes a JSON patch document restricted
//! to the movie's scalar fields.

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::Json;
use filmoteca_core::associations::first_duplicate_key;
use filmoteca_core::error::CoreError;
use filmoteca_core::patch;
use filmoteca_core::storage::CONTAINER_MOVIES;
use filmoteca_core::types::DbId;
use filmoteca_db::mapping::{
    apply_movie_form, apply_movie_patch, assign_cast_order, new_movie,
};
use filmoteca_db::models::movie::{
    Movie, MovieActor, MovieDetailDto, MovieForm, MoviePatchDto, MovieSummaryDto,
};
use filmoteca_db::repositories::MovieRepo;
use filmoteca_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::form::{read_movie_form, read_patch_document};
use crate::handlers::{check_upload, discard_blob, retire_blob};
use crate::state::AppState;

const ENTITY: &str = "Movie";

/// GET /api/v1/movies
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<MovieSummaryDto>>> {
    let movies = MovieRepo::list(&state.pool).await?;
    Ok(Json(movies.iter().map(MovieSummaryDto::from).collect()))
}

/// GET /api/v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MovieDetailDto>> {
    let movie = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    Ok(Json(load_detail(&state.pool, &movie).await?))
}

/// POST /api/v1/movies
///
/// Stores the poster (if any) before inserting. If the insert fails the
/// stored poster is discarded again.
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<MovieDetailDto>)> {
    let (form, poster) = read_movie_form(multipart).await?;
    validate_form(&form)?;
    if let Some(upload) = &poster {
        check_upload(&state, upload)?;
    }

    let mut input = new_movie(&form);
    check_cast(&input.actors)?;

    if let Some(upload) = &poster {
        let reference = state
            .files
            .store(
                &upload.bytes,
                &upload.extension(),
                CONTAINER_MOVIES,
                &upload.content_type,
            )
            .await?;
        input.poster = Some(reference);
    }

    assign_cast_order(&mut input.actors);

    let created = match MovieRepo::create(&state.pool, &input).await {
        Ok(created) => created,
        Err(err) => {
            if let Some(reference) = &input.poster {
                discard_blob(&state, reference, CONTAINER_MOVIES).await;
            }
            return Err(err.into());
        }
    };
    tracing::info!(
        movie_id = created.movie.id,
        poster = ?created.movie.poster,
        genres = created.genres.len(),
        actors = created.actors.len(),
        "Movie created"
    );

    let detail = load_detail(&state.pool, &created.movie).await?;
    let location = format!("/api/v1/movies/{}", created.movie.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(detail)))
}

/// PUT /api/v1/movies/{id}
///
/// Replaces scalars and both association sets. The poster is replaced only
/// when a new file is supplied: the new blob is stored first and the previous
/// one is removed once the save has committed. A failed save discards the
/// new blob and leaves the previous poster in place.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<StatusCode> {
    let loaded = MovieRepo::find_with_associations(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    let (form, poster) = read_movie_form(multipart).await?;
    validate_form(&form)?;
    if let Some(upload) = &poster {
        check_upload(&state, upload)?;
    }

    let mut updated = loaded.clone();
    apply_movie_form(&mut updated, &form);
    check_cast(&updated.actors)?;

    let new_poster = match &poster {
        Some(upload) => Some(
            state
                .files
                .store(
                    &upload.bytes,
                    &upload.extension(),
                    CONTAINER_MOVIES,
                    &upload.content_type,
                )
                .await?,
        ),
        None => None,
    };
    if let Some(reference) = &new_poster {
        updated.movie.poster = Some(reference.clone());
    }

    assign_cast_order(&mut updated.actors);

    let saved = MovieRepo::save(&state.pool, &updated).await;
    if !matches!(saved, Ok(true)) {
        if let Some(reference) = &new_poster {
            discard_blob(&state, reference, CONTAINER_MOVIES).await;
        }
    }
    if !saved? {
        return Err(AppError::not_found(ENTITY, id));
    }

    if let (Some(_), Some(previous)) = (&new_poster, &loaded.movie.poster) {
        retire_blob(&state, previous, CONTAINER_MOVIES).await;
    }
    tracing::info!(movie_id = id, poster = ?new_poster, "Movie updated");

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/movies/{id}
///
/// Applies the patch to a [`MoviePatchDto`] projection, re-validates it,
/// then copies it back. Associations and poster are untouched.
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<StatusCode> {
    let document = read_patch_document(&body)?;

    let mut movie = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;

    let operations = patch::parse_document(document).map_err(CoreError::from)?;
    let mut dto = MoviePatchDto::from(&movie);
    patch::apply(&mut dto, &operations).map_err(CoreError::from)?;
    dto.validate()?;

    apply_movie_patch(&mut movie, dto);
    if !MovieRepo::update(&state.pool, &movie).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    tracing::info!(movie_id = id, operations = operations.len(), "Movie patched");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/movies/{id}
///
/// Association rows cascade. The poster blob stays in storage.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if !MovieRepo::exists(&state.pool, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }

    if MovieRepo::delete(&state.pool, id).await? {
        tracing::info!(movie_id = id, "Movie deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(ENTITY, id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_form(form: &MovieForm) -> AppResult<()> {
    form.validate()?;
    Ok(())
}

/// Each actor may appear in a movie's cast only once.
fn check_cast(actors: &[MovieActor]) -> AppResult<()> {
    match first_duplicate_key(actors) {
        Some(actor_id) => Err(CoreError::Validation(format!(
            "Actor {actor_id} appears more than once in the cast"
        ))
        .into()),
        None => Ok(()),
    }
}

async fn load_detail(pool: &DbPool, movie: &Movie) -> Result<MovieDetailDto, sqlx::Error> {
    let genres = MovieRepo::list_genres(pool, movie.id).await?;
    let cast = MovieRepo::list_cast(pool, movie.id).await?;
    Ok(MovieDetailDto::from_parts(movie, &genres, &cast))
}
