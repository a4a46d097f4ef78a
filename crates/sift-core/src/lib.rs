pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod manifest;
pub mod pool;
pub mod progress;
pub mod relocate;
pub mod scanner;

pub use analysis::move_duplicates;
pub use config::AppConfig;
pub use engine::ScanEngine;
pub use error::Error;
pub use progress::{
    CollectResult, FlattenResult, ItemEvent, Phase, Reporter, ResolveResult, SilentReporter,
    Summary,
};
pub use relocate::flatten_directory;
