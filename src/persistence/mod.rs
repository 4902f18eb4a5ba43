//! World persistence
//!
//! Whole-world text files, written atomically.

pub mod error;
mod world_file;

pub use error::{atomic_write, corrupted_line, PersistenceResult};
pub use world_file::{load_world, read_world, save_world, write_world, WorldSnapshot};
