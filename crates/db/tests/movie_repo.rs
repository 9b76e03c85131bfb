//! Integration tests for the movie repository and its association handling.
//!
//! Exercises the persistence layer against a real database:
//! - Create with genre and cast rows
//! - Full replacement of association sets via `save`, even from a stale read
//! - Scalar-only updates
//! - Cascade delete of association rows
//! - Cast renumbering after an actor is deleted
//! - Foreign key violations for unknown genre ids

use assert_matches::assert_matches;
use chrono::NaiveDate;
use filmoteca_db::mapping::{apply_movie_form, assign_cast_order, new_movie};
use filmoteca_db::models::actor::NewActor;
use filmoteca_db::models::genre::CreateGenre;
use filmoteca_db::models::movie::{ActorCredit, MovieForm};
use filmoteca_db::repositories::{ActorRepo, GenreRepo, MovieRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_genre(pool: &PgPool, name: &str) -> i64 {
    GenreRepo::create(
        pool,
        &CreateGenre {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_actor(pool: &PgPool, name: &str) -> i64 {
    ActorRepo::create(
        pool,
        &NewActor {
            name: name.to_string(),
            date_of_birth: None,
            photo: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn credit(actor_id: i64, character: &str) -> ActorCredit {
    ActorCredit {
        actor_id,
        character: character.to_string(),
    }
}

async fn stored_cast(pool: &PgPool, movie_id: i64) -> Vec<(i64, i32)> {
    sqlx::query_as::<_, (i64, i32)>(
        "SELECT actor_id, sort_order FROM movies_actors WHERE movie_id = $1 ORDER BY sort_order",
    )
    .bind(movie_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

async fn stored_genres(pool: &PgPool, movie_id: i64) -> Vec<i64> {
    sqlx::query_scalar(
        "SELECT genre_id FROM movies_genres WHERE movie_id = $1 ORDER BY genre_id",
    )
    .bind(movie_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_persists_movie_and_associations(pool: PgPool) {
    let scifi = seed_genre(&pool, "Sci-Fi").await;
    let cobb = seed_actor(&pool, "Leonardo DiCaprio").await;
    let arthur = seed_actor(&pool, "Joseph Gordon-Levitt").await;

    let form = MovieForm {
        title: "Inception".into(),
        release_date: NaiveDate::from_ymd_opt(2010, 7, 16),
        summary: None,
        genre_ids: vec![scifi],
        actors: vec![credit(cobb, "Cobb"), credit(arthur, "Arthur")],
    };
    let mut input = new_movie(&form);
    assign_cast_order(&mut input.actors);

    let created = MovieRepo::create(&pool, &input).await.unwrap();
    assert!(created.movie.id > 0);
    assert_eq!(created.movie.title, "Inception");

    assert_eq!(stored_cast(&pool, created.movie.id).await, vec![(cobb, 0), (arthur, 1)]);
    assert_eq!(stored_genres(&pool, created.movie.id).await, vec![scifi]);

    let loaded = MovieRepo::find_with_associations(&pool, created.movie.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.actors[0].character, "Cobb");
    assert_eq!(loaded.actors[1].order, Some(1));

    let cast = MovieRepo::list_cast(&pool, created.movie.id).await.unwrap();
    assert_eq!(cast[0].name, "Leonardo DiCaprio");
    let genres = MovieRepo::list_genres(&pool, created.movie.id).await.unwrap();
    assert_eq!(genres[0].name, "Sci-Fi");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_replaces_association_sets_exactly(pool: PgPool) {
    let drama = seed_genre(&pool, "Drama").await;
    let comedy = seed_genre(&pool, "Comedy").await;
    let horror = seed_genre(&pool, "Horror").await;
    let a = seed_actor(&pool, "A").await;
    let b = seed_actor(&pool, "B").await;
    let c = seed_actor(&pool, "C").await;

    let mut input = new_movie(&MovieForm {
        title: "Before".into(),
        genre_ids: vec![drama, comedy],
        actors: vec![credit(a, "One"), credit(b, "Two")],
        ..Default::default()
    });
    assign_cast_order(&mut input.actors);
    let id = MovieRepo::create(&pool, &input).await.unwrap().movie.id;

    let loaded = MovieRepo::find_with_associations(&pool, id)
        .await
        .unwrap()
        .unwrap();
    let mut updated = loaded.clone();
    apply_movie_form(
        &mut updated,
        &MovieForm {
            title: "After".into(),
            genre_ids: vec![horror, comedy],
            actors: vec![credit(c, "Three"), credit(a, "One again")],
            ..Default::default()
        },
    );
    assign_cast_order(&mut updated.actors);

    assert!(MovieRepo::save(&pool, &updated).await.unwrap());

    let mut expected_genres = vec![comedy, horror];
    expected_genres.sort();
    assert_eq!(stored_genres(&pool, id).await, expected_genres);
    assert_eq!(stored_cast(&pool, id).await, vec![(c, 0), (a, 1)]);

    let reloaded = MovieRepo::find_with_associations(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.movie.title, "After");
    assert_eq!(reloaded.actors[1].character, "One again");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_from_stale_read_stores_exactly_the_submitted_sets(pool: PgPool) {
    let first = seed_genre(&pool, "First").await;
    let second = seed_genre(&pool, "Second").await;
    let third = seed_genre(&pool, "Third").await;
    let a = seed_actor(&pool, "A").await;
    let b = seed_actor(&pool, "B").await;

    let mut input = new_movie(&MovieForm {
        title: "Contested".into(),
        genre_ids: vec![first],
        actors: vec![credit(a, "Lead")],
        ..Default::default()
    });
    assign_cast_order(&mut input.actors);
    let id = MovieRepo::create(&pool, &input).await.unwrap().movie.id;

    // Both writers read the same state before either saves.
    let snapshot = MovieRepo::find_with_associations(&pool, id)
        .await
        .unwrap()
        .unwrap();

    let mut earlier = snapshot.clone();
    apply_movie_form(
        &mut earlier,
        &MovieForm {
            title: "Earlier".into(),
            genre_ids: vec![second],
            actors: vec![credit(b, "Rival")],
            ..Default::default()
        },
    );
    assign_cast_order(&mut earlier.actors);
    assert!(MovieRepo::save(&pool, &earlier).await.unwrap());

    let mut later = snapshot.clone();
    apply_movie_form(
        &mut later,
        &MovieForm {
            title: "Later".into(),
            genre_ids: vec![third],
            actors: vec![credit(a, "Lead again")],
            ..Default::default()
        },
    );
    assign_cast_order(&mut later.actors);
    assert!(MovieRepo::save(&pool, &later).await.unwrap());

    assert_eq!(stored_genres(&pool, id).await, vec![third]);
    assert_eq!(stored_cast(&pool, id).await, vec![(a, 0)]);
    let reloaded = MovieRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(reloaded.title, "Later");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_on_missing_movie_writes_nothing(pool: PgPool) {
    let input = new_movie(&MovieForm {
        title: "Ghost".into(),
        ..Default::default()
    });
    let created = MovieRepo::create(&pool, &input).await.unwrap();
    assert!(MovieRepo::delete(&pool, created.movie.id).await.unwrap());

    let saved = MovieRepo::save(&pool, &created).await.unwrap();
    assert!(!saved);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_touches_only_movie_row(pool: PgPool) {
    let genre = seed_genre(&pool, "Noir").await;
    let input = new_movie(&MovieForm {
        title: "Original".into(),
        genre_ids: vec![genre],
        ..Default::default()
    });
    let created = MovieRepo::create(&pool, &input).await.unwrap();

    let mut movie = created.movie.clone();
    movie.title = "Renamed".into();
    movie.summary = Some("Now with a summary".into());
    assert!(MovieRepo::update(&pool, &movie).await.unwrap());

    let reloaded = MovieRepo::find_by_id(&pool, movie.id).await.unwrap().unwrap();
    assert_eq!(reloaded.title, "Renamed");
    assert_eq!(reloaded.summary.as_deref(), Some("Now with a summary"));
    assert_eq!(stored_genres(&pool, movie.id).await, vec![genre]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_cascades_association_rows(pool: PgPool) {
    let genre = seed_genre(&pool, "Western").await;
    let actor = seed_actor(&pool, "Clint").await;
    let mut input = new_movie(&MovieForm {
        title: "Unforgiven".into(),
        genre_ids: vec![genre],
        actors: vec![credit(actor, "Will Munny")],
        ..Default::default()
    });
    assign_cast_order(&mut input.actors);
    let id = MovieRepo::create(&pool, &input).await.unwrap().movie.id;

    assert!(MovieRepo::exists(&pool, id).await.unwrap());
    assert!(MovieRepo::delete(&pool, id).await.unwrap());
    assert!(!MovieRepo::exists(&pool, id).await.unwrap());
    assert!(stored_genres(&pool, id).await.is_empty());
    assert!(stored_cast(&pool, id).await.is_empty());

    // Second delete finds nothing.
    assert!(!MovieRepo::delete(&pool, id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_genre_id_is_a_foreign_key_violation(pool: PgPool) {
    let input = new_movie(&MovieForm {
        title: "Orphan".into(),
        genre_ids: vec![999_999],
        ..Default::default()
    });
    let err = MovieRepo::create(&pool, &input).await.unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503")
    );

    // The transaction rolled back: no movie row was left behind.
    assert!(MovieRepo::list(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn genre_and_actor_crud(pool: PgPool) {
    let id = seed_genre(&pool, "Musical").await;
    let renamed = GenreRepo::update(
        &pool,
        id,
        &CreateGenre {
            name: "Musicals".into(),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.name, "Musicals");
    assert_eq!(GenreRepo::list(&pool).await.unwrap().len(), 1);
    assert!(GenreRepo::delete(&pool, id).await.unwrap());
    assert!(GenreRepo::find_by_id(&pool, id).await.unwrap().is_none());

    let actor_id = seed_actor(&pool, "Gene Kelly").await;
    let mut actor = ActorRepo::find_by_id(&pool, actor_id).await.unwrap().unwrap();
    actor.photo = Some("http://files/actors/gene.jpg".into());
    assert!(ActorRepo::save(&pool, &actor).await.unwrap());
    let reloaded = ActorRepo::find_by_id(&pool, actor_id).await.unwrap().unwrap();
    assert_eq!(reloaded.photo, actor.photo);
    assert!(ActorRepo::exists(&pool, actor_id).await.unwrap());
    assert!(ActorRepo::delete(&pool, actor_id).await.unwrap());
    assert!(!ActorRepo::exists(&pool, actor_id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_actor_renumbers_remaining_cast(pool: PgPool) {
    let a = seed_actor(&pool, "A").await;
    let b = seed_actor(&pool, "B").await;
    let c = seed_actor(&pool, "C").await;

    let mut input = new_movie(&MovieForm {
        title: "Ensemble".into(),
        actors: vec![credit(a, "First"), credit(b, "Second"), credit(c, "Third")],
        ..Default::default()
    });
    assign_cast_order(&mut input.actors);
    let id = MovieRepo::create(&pool, &input).await.unwrap().movie.id;

    let mut other = new_movie(&MovieForm {
        title: "Duo".into(),
        actors: vec![credit(c, "Only")],
        ..Default::default()
    });
    assign_cast_order(&mut other.actors);
    let other_id = MovieRepo::create(&pool, &other).await.unwrap().movie.id;

    assert!(ActorRepo::delete(&pool, b).await.unwrap());

    assert_eq!(stored_cast(&pool, id).await, vec![(a, 0), (c, 1)]);
    assert_eq!(stored_cast(&pool, other_id).await, vec![(c, 0)]);

    let reloaded = MovieRepo::find_with_associations(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.actors[1].character, "Third");
    assert_eq!(reloaded.actors[1].order, Some(1));
}
