use axum::extract::{Path, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::Json;
use filmoteca_core::types::DbId;
use filmoteca_db::models::genre::{CreateGenre, GenreDto};
use filmoteca_db::repositories::GenreRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const ENTITY: &str = "Genre";

/// GET /api/v1/genres
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<GenreDto>>> {
    let genres = GenreRepo::list(&state.pool).await?;
    Ok(Json(genres.iter().map(GenreDto::from).collect()))
}

/// GET /api/v1/genres/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<GenreDto>> {
    let genre = GenreRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    Ok(Json(GenreDto::from(&genre)))
}

/// POST /api/v1/genres
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateGenre>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<GenreDto>)> {
    input.validate()?;
    let genre = GenreRepo::create(&state.pool, &input).await?;
    tracing::info!(genre_id = genre.id, name = %genre.name, "Genre created");

    let location = format!("/api/v1/genres/{}", genre.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(GenreDto::from(&genre)),
    ))
}

/// PUT /api/v1/genres/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateGenre>,
) -> AppResult<StatusCode> {
    input.validate()?;
    GenreRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found(ENTITY, id))?;
    tracing::info!(genre_id = id, "Genre renamed");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/genres/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if GenreRepo::delete(&state.pool, id).await? {
        tracing::info!(genre_id = id, "Genre deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(ENTITY, id))
    }
}
