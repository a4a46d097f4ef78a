use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sift")]
#[command(
    about = "Fingerprint a tree, set duplicates aside, flatten directories",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan DIRECTORY and write a manifest of every file's fingerprint
    CreateFileList(CreateFileListArgs),
    /// Move every file whose fingerprint was already seen into DUPLICATES_DIR
    MoveDuplicates(MoveDuplicatesArgs),
    /// Move every nested file up into TARGET_DIR and remove emptied subdirectories
    FlattenDirectory(FlattenDirectoryArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct CreateFileListArgs {
    pub directory: PathBuf,
    pub output_manifest: PathBuf,
    /// Concurrent fingerprinting workers (overrides configuration)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,
}

#[derive(Debug, Args)]
pub struct MoveDuplicatesArgs {
    pub input_manifest: PathBuf,
    pub duplicates_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct FlattenDirectoryArgs {
    pub target_dir: PathBuf,
}
