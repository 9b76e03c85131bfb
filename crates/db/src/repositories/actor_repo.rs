//! Repository for the `actors` table.

use filmoteca_core::types::DbId;
use sqlx::PgPool;

use crate::models::actor::{Actor, NewActor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, date_of_birth, photo, created_at, updated_at";

/// Provides CRUD operations for actors.
pub struct ActorRepo;

impl ActorRepo {
    /// Insert a new actor, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewActor) -> Result<Actor, sqlx::Error> {
        let query = format!(
            "INSERT INTO actors (name, date_of_birth, photo)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Actor>(&query)
            .bind(&input.name)
            .bind(input.date_of_birth)
            .bind(&input.photo)
            .fetch_one(pool)
            .await
    }

    /// Find an actor by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Actor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM actors WHERE id = $1");
        sqlx::query_as::<_, Actor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all actors alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Actor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM actors ORDER BY name, id");
        sqlx::query_as::<_, Actor>(&query).fetch_all(pool).await
    }

    /// Write every mutable column of `actor` back to its row.
    ///
    /// Returns `false` if the row no longer exists.
    pub async fn save(pool: &PgPool, actor: &Actor) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE actors SET name = $2, date_of_birth = $3, photo = $4 WHERE id = $1",
        )
        .bind(actor.id)
        .bind(&actor.name)
        .bind(actor.date_of_birth)
        .bind(&actor.photo)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check whether an actor exists without loading it.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM actors WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Permanently delete an actor.
    ///
    /// Movie credits cascade; the remaining cast of every affected movie is
    /// renumbered to `0..n` in one transaction. Returns `true` if a row was
    /// removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let movie_ids: Vec<DbId> =
            sqlx::query_scalar("SELECT movie_id FROM movies_actors WHERE actor_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let result = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if !movie_ids.is_empty() {
            sqlx::query(
                "UPDATE movies_actors ma
                 SET sort_order = ranked.position
                 FROM (
                     SELECT movie_id, actor_id,
                            (ROW_NUMBER() OVER (
                                PARTITION BY movie_id ORDER BY sort_order, actor_id
                            ) - 1)::INTEGER AS position
                     FROM movies_actors
                     WHERE movie_id = ANY($1)
                 ) ranked
                 WHERE ma.movie_id = ranked.movie_id
                   AND ma.actor_id = ranked.actor_id
                   AND ma.sort_order <> ranked.position",
            )
            .bind(&movie_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
