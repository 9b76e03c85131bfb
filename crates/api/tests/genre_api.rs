//! HTTP-level integration tests for the `/genres` resource.

mod common;

use axum::http::{header, StatusCode};
use common::{body_json, delete, get, post_json, put_json, seed_genre};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_genre_returns_201_with_location(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, storage.path());
    let response = post_json(app, "/api/v1/genres", json!({"name": "Drama"})).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    let json = body_json(response).await;
    assert_eq!(json["name"], "Drama");
    assert_eq!(location, format!("/api/v1/genres/{}", json["id"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_genre_with_long_name_returns_400(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, storage.path());
    let response = post_json(app, "/api/v1/genres", json!({"name": "x".repeat(41)})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"]["name"][0], "length");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_and_get_genres(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let thriller = seed_genre(&pool, "Thriller").await;
    seed_genre(&pool, "Drama").await;

    let app = common::build_test_app(pool.clone(), storage.path());
    let json = body_json(get(app, "/api/v1/genres").await).await;
    assert_eq!(json[0]["name"], "Drama");
    assert_eq!(json[1]["name"], "Thriller");

    let app = common::build_test_app(pool, storage.path());
    let response = get(app, &format!("/api/v1/genres/{thriller}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"id": thriller, "name": "Thriller"}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rename_genre_returns_204(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let id = seed_genre(&pool, "Sci-Fi").await;

    let app = common::build_test_app(pool.clone(), storage.path());
    let response = put_json(
        app,
        &format!("/api/v1/genres/{id}"),
        json!({"name": "Science Fiction"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool, storage.path());
    let json = body_json(get(app, &format!("/api/v1/genres/{id}")).await).await;
    assert_eq!(json["name"], "Science Fiction");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_genre_returns_404_for_get_put_delete(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();

    let app = common::build_test_app(pool.clone(), storage.path());
    assert_eq!(get(app, "/api/v1/genres/999999").await.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone(), storage.path());
    let response = put_json(app, "/api/v1/genres/999999", json!({"name": "Noir"})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool, storage.path());
    assert_eq!(delete(app, "/api/v1/genres/999999").await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_genre_unlinks_it_from_movies(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let drama = seed_genre(&pool, "Drama").await;
    let movie_id: i64 = sqlx::query_scalar("INSERT INTO movies (title) VALUES ('Heat') RETURNING id")
        .fetch_one(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO movies_genres (movie_id, genre_id) VALUES ($1, $2)")
        .bind(movie_id)
        .bind(drama)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone(), storage.path());
    let response = delete(app, &format!("/api/v1/genres/{drama}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool, storage.path());
    let json = body_json(get(app, &format!("/api/v1/movies/{movie_id}")).await).await;
    assert_eq!(json["genres"], json!([]));
}
