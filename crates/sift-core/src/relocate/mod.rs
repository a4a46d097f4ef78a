pub mod flatten;
pub mod mover;

pub use flatten::flatten_directory;
pub use mover::{move_into, move_into_with, unique_destination, MoveOutcome};
