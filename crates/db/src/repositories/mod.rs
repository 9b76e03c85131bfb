//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. A method acquires its own
//! connection (or transaction) and releases it before returning.

pub mod actor_repo;
pub mod genre_repo;
pub mod movie_repo;

pub use actor_repo::ActorRepo;
pub use genre_repo::GenreRepo;
pub use movie_repo::MovieRepo;
