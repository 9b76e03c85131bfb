//! Conversions between entities and wire DTOs.
//!
//! Everything here is a pure structural transform: no lookups, no
//! validation. Identifier lists are turned into association rows as-is;
//! whether a referenced genre or actor exists is left to the foreign keys.
//! Blob references (poster, photo) are never copied from input, the
//! handlers set them after storage succeeds.

use filmoteca_core::associations::dedup_by_key;
use filmoteca_core::types::DbId;

use crate::models::actor::{Actor, ActorDto, ActorForm, ActorPatchDto, NewActor};
use crate::models::genre::{Genre, GenreDto};
use crate::models::movie::{
    ActorCredit, CastCredit, CastMemberDto, Movie, MovieActor, MovieAggregate, MovieDetailDto,
    MovieForm, MovieGenre, MoviePatchDto, MovieSummaryDto, NewMovie,
};

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

impl From<&Genre> for GenreDto {
    fn from(genre: &Genre) -> Self {
        Self {
            id: genre.id,
            name: genre.name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

impl From<&Actor> for ActorDto {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.name.clone(),
            date_of_birth: actor.date_of_birth,
            photo: actor.photo.clone(),
        }
    }
}

/// Build an unsaved actor from the form. The photo is left unset.
pub fn new_actor(form: &ActorForm) -> NewActor {
    NewActor {
        name: form.name.clone(),
        date_of_birth: form.date_of_birth,
        photo: None,
    }
}

/// Overwrite an actor's scalar fields from the form, keeping id and photo.
pub fn apply_actor_form(actor: &mut Actor, form: &ActorForm) {
    actor.name = form.name.clone();
    actor.date_of_birth = form.date_of_birth;
}

impl From<&Actor> for ActorPatchDto {
    fn from(actor: &Actor) -> Self {
        Self {
            name: actor.name.clone(),
            date_of_birth: actor.date_of_birth,
        }
    }
}

/// Copy a validated patch DTO back onto the actor.
pub fn apply_actor_patch(actor: &mut Actor, patch: ActorPatchDto) {
    actor.name = patch.name;
    actor.date_of_birth = patch.date_of_birth;
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

impl From<&Movie> for MovieSummaryDto {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            release_date: movie.release_date,
            summary: movie.summary.clone(),
            poster: movie.poster.clone(),
        }
    }
}

impl MovieDetailDto {
    /// Assemble the detail view from a movie row and its joined associations.
    pub fn from_parts(movie: &Movie, genres: &[Genre], cast: &[CastCredit]) -> Self {
        Self {
            movie: MovieSummaryDto::from(movie),
            genres: genres.iter().map(GenreDto::from).collect(),
            actors: cast
                .iter()
                .map(|c| CastMemberDto {
                    actor_id: c.actor_id,
                    name: c.name.clone(),
                    character: c.character_name.clone(),
                    order: c.sort_order,
                })
                .collect(),
        }
    }
}

/// One association row per submitted genre id. Repeated ids collapse to
/// their first occurrence since the pair is the table's primary key.
pub fn map_movie_genres(genre_ids: &[DbId]) -> Vec<MovieGenre> {
    dedup_by_key(
        genre_ids
            .iter()
            .map(|&genre_id| MovieGenre { genre_id })
            .collect(),
    )
}

/// One association row per submitted credit, in submission order, with the
/// display order still unassigned.
pub fn map_movie_actors(credits: &[ActorCredit]) -> Vec<MovieActor> {
    credits
        .iter()
        .map(|credit| MovieActor {
            actor_id: credit.actor_id,
            character: credit.character.clone(),
            order: None,
        })
        .collect()
}

/// Build an unsaved movie from the form. The poster is left unset and the
/// cast order is not yet assigned.
pub fn new_movie(form: &MovieForm) -> NewMovie {
    NewMovie {
        title: form.title.clone(),
        release_date: form.release_date,
        summary: form.summary.clone(),
        poster: None,
        genres: map_movie_genres(&form.genre_ids),
        actors: map_movie_actors(&form.actors),
    }
}

/// Overwrite a loaded movie from the form: scalars in place, association
/// sets replaced wholesale. Id and poster are kept.
pub fn apply_movie_form(aggregate: &mut MovieAggregate, form: &MovieForm) {
    let movie = &mut aggregate.movie;
    movie.title = form.title.clone();
    movie.release_date = form.release_date;
    movie.summary = form.summary.clone();

    aggregate.genres = map_movie_genres(&form.genre_ids);
    aggregate.actors = map_movie_actors(&form.actors);
}

/// Number the cast `0..n` by position, discarding any previous order.
pub fn assign_cast_order(actors: &mut [MovieActor]) {
    for (position, actor) in actors.iter_mut().enumerate() {
        actor.order = Some(position as i32);
    }
}

impl From<&Movie> for MoviePatchDto {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            release_date: movie.release_date,
            summary: movie.summary.clone(),
        }
    }
}

/// Copy a validated patch DTO back onto the movie.
pub fn apply_movie_patch(movie: &mut Movie, patch: MoviePatchDto) {
    movie.title = patch.title;
    movie.release_date = patch.release_date;
    movie.summary = patch.summary;
}
