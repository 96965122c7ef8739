//! SQLite backend for the Badger engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
