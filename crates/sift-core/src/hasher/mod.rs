pub mod xxhash;

pub use xxhash::{fingerprint_file, hash_data, CHUNK_SIZE, SEED};
