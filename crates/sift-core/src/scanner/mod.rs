pub mod walk;

pub use walk::{list_files, list_nested_files, FileListing, ScanOptions};
