pub mod actor;
pub mod genre;
pub mod health;
pub mod movie;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /movies                  list, create (multipart)
/// /movies/{id}             get, replace (multipart), patch (JSON patch), delete
///
/// /genres                  list, create
/// /genres/{id}             get, rename, delete
///
/// /actors                  list, create (multipart)
/// /actors/{id}             get, replace (multipart), patch (JSON patch), delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Movie catalog with genre and cast associations.
        .nest("/movies", movie::router())
        // Genre lookup table.
        .nest("/genres", genre::router())
        // Actor directory.
        .nest("/actors", actor::router())
}
