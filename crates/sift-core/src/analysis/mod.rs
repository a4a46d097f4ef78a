pub mod duplicates;

pub use duplicates::{build_hash_groups, move_duplicates, resolve_records, HashGroup};
