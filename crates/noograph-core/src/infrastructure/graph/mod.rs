//! SQLite-backed graph persistence

pub mod repository;

pub use repository::SqliteGraphRepository;
