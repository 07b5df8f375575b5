use clap::Subcommand;
use std::path::{Path, PathBuf};

use crate::formats::rst::RstVersion;
use crate::hashes::{self, HashNames};

pub mod convert;
pub mod hash;
pub mod table;

/// Parse a `--v5-variant` value, accepting only version 5 layouts
fn parse_v5_variant(s: &str) -> Result<RstVersion, String> {
    s.parse::<RstVersion>()
        .and_then(RstVersion::require_v5)
        .map_err(|e| e.to_string())
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert string tables between binary and JSON
    ///
    /// The direction is detected per file: binary tables become `.json`,
    /// anything else is read as JSON and becomes `.stringtable`.
    Convert {
        /// Files to convert
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory of hash lists (defaults to `hashes/` next to the executable)
        #[arg(long)]
        hashes: Option<PathBuf>,

        /// Write outputs here instead of next to the inputs
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Layout to write JSON input as, overriding the document's version
        #[arg(long)]
        version: Option<RstVersion>,

        /// Layout assumed for binary version byte 5
        #[arg(long, default_value_t = RstVersion::LATEST, value_parser = parse_v5_variant)]
        v5_variant: RstVersion,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show header and content statistics of a string table
    Info {
        /// String table file
        path: PathBuf,

        /// Layout assumed for binary version byte 5
        #[arg(long, default_value_t = RstVersion::LATEST, value_parser = parse_v5_variant)]
        v5_variant: RstVersion,
    },

    /// Print a single entry
    Get {
        /// String table file
        path: PathBuf,

        /// Entry name, hex hash or `{hex}` hash
        key: String,

        /// Layout assumed for binary version byte 5
        #[arg(long, default_value_t = RstVersion::LATEST, value_parser = parse_v5_variant)]
        v5_variant: RstVersion,
    },

    /// Print the key hash of an entry name
    Hash {
        /// Entry name
        text: String,

        /// Only hash for this layout (defaults to all layouts)
        #[arg(long)]
        version: Option<RstVersion>,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Convert {
                paths,
                hashes,
                output_dir,
                version,
                v5_variant,
                quiet,
            } => convert::execute(
                paths,
                hashes.as_deref(),
                output_dir.as_deref(),
                *version,
                *v5_variant,
                *quiet,
            ),
            Commands::Info { path, v5_variant } => table::info(path, *v5_variant),
            Commands::Get {
                path,
                key,
                v5_variant,
            } => table::get(path, key, *v5_variant),
            Commands::Hash { text, version } => hash::execute(text, *version),
        }
    }
}

/// Load hash lists from `dir`, or from the default directory when absent
pub(crate) fn load_hash_names(dir: Option<&Path>) -> anyhow::Result<HashNames> {
    match dir {
        Some(dir) => {
            if !dir.is_dir() {
                anyhow::bail!("Hash list directory not found: {}", dir.display());
            }
            Ok(HashNames::from_dir(dir)?)
        }
        None => {
            if let Some(dir) = hashes::default_hashes_dir() {
                Ok(HashNames::from_dir(dir)?)
            } else {
                tracing::debug!("No hashes directory next to the executable");
                Ok(HashNames::empty())
            }
        }
    }
}
