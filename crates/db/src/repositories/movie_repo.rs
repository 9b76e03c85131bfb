//! Repository for the `movies` table and its `movies_genres` /
//! `movies_actors` junction tables.

use filmoteca_core::associations::{diff, AssociationChange};
use filmoteca_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::genre::Genre;
use crate::models::movie::{
    CastCredit, Movie, MovieActor, MovieAggregate, MovieGenre, NewMovie,
};

/// Column list for the `movies` table.
const COLUMNS: &str = "id, title, release_date, summary, poster, created_at, updated_at";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Provides CRUD operations for movies and their associations.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a movie and all of its association rows in one transaction.
    pub async fn create(pool: &PgPool, input: &NewMovie) -> Result<MovieAggregate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO movies (title, release_date, summary, poster)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let movie = sqlx::query_as::<_, Movie>(&insert_query)
            .bind(&input.title)
            .bind(input.release_date)
            .bind(&input.summary)
            .bind(&input.poster)
            .fetch_one(&mut *tx)
            .await?;

        for genre in &input.genres {
            Self::upsert_genre(&mut tx, movie.id, genre).await?;
        }
        for actor in &input.actors {
            Self::upsert_actor(&mut tx, movie.id, actor).await?;
        }

        tx.commit().await?;
        Ok(MovieAggregate {
            movie,
            genres: input.genres.clone(),
            actors: input.actors.clone(),
        })
    }

    /// Find a movie row by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a movie together with its genre and cast rows.
    pub async fn find_with_associations(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MovieAggregate>, sqlx::Error> {
        let Some(movie) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let genres = Self::load_genres(pool, id).await?;
        let actors = Self::load_actors(pool, id).await?;

        Ok(Some(MovieAggregate {
            movie,
            genres,
            actors,
        }))
    }

    /// List every movie, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies ORDER BY id");
        sqlx::query_as::<_, Movie>(&query).fetch_all(pool).await
    }

    /// Check whether a movie exists without loading it.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM movies WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Genres linked to a movie, alphabetically.
    pub async fn list_genres(pool: &PgPool, movie_id: DbId) -> Result<Vec<Genre>, sqlx::Error> {
        sqlx::query_as::<_, Genre>(
            "SELECT g.id, g.name, g.created_at, g.updated_at
             FROM genres g
             JOIN movies_genres mg ON mg.genre_id = g.id
             WHERE mg.movie_id = $1
             ORDER BY g.name, g.id",
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
    }

    /// Cast of a movie joined with actor names, in display order.
    pub async fn list_cast(pool: &PgPool, movie_id: DbId) -> Result<Vec<CastCredit>, sqlx::Error> {
        sqlx::query_as::<_, CastCredit>(
            "SELECT ma.actor_id, a.name, ma.character_name, ma.sort_order
             FROM movies_actors ma
             JOIN actors a ON a.id = ma.actor_id
             WHERE ma.movie_id = $1
             ORDER BY ma.sort_order, ma.actor_id",
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
    }

    /// Write only the `movies` row (scalars and poster). Associations are
    /// left as they are.
    ///
    /// Returns `false` if the row no longer exists.
    pub async fn update(pool: &PgPool, movie: &Movie) -> Result<bool, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::update_row(&mut *conn, movie).await
    }

    /// Persist `updated`: overwrite the `movies` row and bring the
    /// association sets to exactly `updated.genres` / `updated.actors`.
    ///
    /// The movie row is locked first and the current associations are read
    /// inside the same transaction, so the diff is always taken against
    /// committed state and concurrent saves of one movie serialize.
    /// Returns `false` (and writes nothing) if the movie no longer exists.
    pub async fn save(pool: &PgPool, updated: &MovieAggregate) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let movie_id = updated.movie.id;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM movies WHERE id = $1 FOR UPDATE")
                .bind(movie_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(false);
        }

        let current_genres = Self::load_genres(&mut *tx, movie_id).await?;
        let current_actors = Self::load_actors(&mut *tx, movie_id).await?;

        Self::update_row(&mut *tx, &updated.movie).await?;

        for change in diff(&current_genres, &updated.genres) {
            match change {
                AssociationChange::Insert(genre) | AssociationChange::Update(genre) => {
                    Self::upsert_genre(&mut tx, movie_id, &genre).await?;
                }
                AssociationChange::Delete(genre_id) => {
                    sqlx::query("DELETE FROM movies_genres WHERE movie_id = $1 AND genre_id = $2")
                        .bind(movie_id)
                        .bind(genre_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        for change in diff(&current_actors, &updated.actors) {
            match change {
                AssociationChange::Insert(actor) | AssociationChange::Update(actor) => {
                    Self::upsert_actor(&mut tx, movie_id, &actor).await?;
                }
                AssociationChange::Delete(actor_id) => {
                    sqlx::query("DELETE FROM movies_actors WHERE movie_id = $1 AND actor_id = $2")
                        .bind(movie_id)
                        .bind(actor_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Permanently delete a movie by ID. Association rows cascade.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn load_genres<'e, E>(executor: E, movie_id: DbId) -> Result<Vec<MovieGenre>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, MovieGenre>(
            "SELECT genre_id FROM movies_genres WHERE movie_id = $1 ORDER BY genre_id",
        )
        .bind(movie_id)
        .fetch_all(executor)
        .await
    }

    async fn load_actors<'e, E>(executor: E, movie_id: DbId) -> Result<Vec<MovieActor>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, MovieActor>(
            "SELECT actor_id, character_name, sort_order
             FROM movies_actors
             WHERE movie_id = $1
             ORDER BY sort_order, actor_id",
        )
        .bind(movie_id)
        .fetch_all(executor)
        .await
    }

    async fn update_row(conn: &mut sqlx::PgConnection, movie: &Movie) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE movies SET title = $2, release_date = $3, summary = $4, poster = $5
             WHERE id = $1",
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(movie.release_date)
        .bind(&movie.summary)
        .bind(&movie.poster)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Link a genre. A concurrent writer may have linked it already.
    async fn upsert_genre(
        tx: &mut Tx<'_>,
        movie_id: DbId,
        genre: &MovieGenre,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO movies_genres (movie_id, genre_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(movie_id)
        .bind(genre.genre_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Insert or overwrite a cast row. An unassigned order falls back to 0.
    async fn upsert_actor(
        tx: &mut Tx<'_>,
        movie_id: DbId,
        actor: &MovieActor,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO movies_actors (movie_id, actor_id, character_name, sort_order)
             VALUES ($1, $2, $3, COALESCE($4, 0))
             ON CONFLICT (movie_id, actor_id) DO UPDATE SET
                character_name = EXCLUDED.character_name,
                sort_order = EXCLUDED.sort_order",
        )
        .bind(movie_id)
        .bind(actor.actor_id)
        .bind(&actor.character)
        .bind(actor.order)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
