//! # `RstKit`
//!
//! A pure-Rust library for reading, writing and converting versioned RST
//! localized string tables (`.stringtable`).
//!
//! ## Supported Layouts
//!
//! - **v2** - `XxHash64` keys (40 bits), optional embedded font config
//! - **v3** - `XxHash64` keys (40 bits)
//! - **v4** - `XxHash64` keys (39 bits)
//! - **v5** - three variants sharing version byte `5`:
//!   legacy (`XxHash64`/39), patch 14.15 (`XXH3`/39), patch 15.02 (`XXH3`/38)
//!
//! ## Quick Start
//!
//! ### Reading and Writing Tables
//!
//! ```no_run
//! use rstkit::formats::rst::{RstTable, RstVersion, read_rst, write_rst};
//!
//! let mut table = RstTable::new(RstVersion::V5Patch1502);
//! table.insert_named("game_item_name", "Sword")?;
//! write_rst("items.stringtable", &table)?;
//!
//! let loaded = read_rst("items.stringtable")?;
//! assert_eq!(loaded.get_named("game_item_name"), Some("Sword"));
//! # Ok::<(), rstkit::Error>(())
//! ```
//!
//! ### Converting to JSON
//!
//! ```no_run
//! use rstkit::converter::convert_rst_to_json;
//! use rstkit::hashes::HashNames;
//!
//! let names = HashNames::from_dir("hashes")?;
//! convert_rst_to_json("items.stringtable", "items.json", &names)?;
//! # Ok::<(), rstkit::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `rstkit` command-line binary

pub mod converter;
pub mod error;
pub mod formats;
pub mod hashes;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::rst::{
        HashAlgorithm, Metadata, ReadOptions, RstReader, RstTable, RstVersion, RstWriter,
        parse_rst_bytes, read_rst, serialize_rst, write_rst,
    };

    pub use crate::converter;
    pub use crate::converter::{
        BatchConvertResult, ConvertOptions, batch_convert, convert_file, from_json, to_json,
    };
    pub use crate::hashes::{HashNames, HashNamesBuilder};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
