//! CLI option parsing with clap for ed2ksum.

use clap::Parser;
use ed2k_stream::BoundaryMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute and check ED2K checksums")]
pub struct Opts {
    /// Files to hash, or check files with --check; `-` reads stdin
    #[arg(default_value = "-")]
    pub paths: Vec<PathBuf>,

    /// Append a null chunk to files whose size is a multiple of the chunk
    /// size (the old "red" hash, still the primary hash on AniDB)
    #[arg(long)]
    pub null_chunk: bool,

    /// Read checksums from the files and verify them
    #[arg(long, short = 'c', conflicts_with = "uri")]
    pub check: bool,

    /// Output ed2k URIs instead of checksum lines
    #[arg(long)]
    pub uri: bool,
}

impl Opts {
    pub fn mode(&self) -> BoundaryMode {
        BoundaryMode::from_null_chunk(self.null_chunk)
    }
}
