//! `.stringtable` (RST) localized string table format
//!
//! Binary format mapping 64-bit name hashes to strings. Five major
//! versions exist; version 5 has three variants that differ only in how
//! keys are hashed. Can be converted to/from JSON.
//!
//! Layout (little-endian):
//!
//! ```text
//! "RST" | version: u8
//! [v2]  has_font_config: u8 [ len: i32 | bytes ]
//! entry_count: i32
//! entry_count x u64   (hash | content_offset << mask_bits)
//! [v2-v4] padding: u8
//! null-terminated UTF-8 strings
//! ```

mod hash;
mod reader;
mod string_table;
mod table;
mod version;
mod writer;

pub use hash::{HashAlgorithm, HashFunction, HashTrim};
pub use reader::{
    FileProperties, ReadOptions, RstReader, parse_rst_bytes, parse_rst_bytes_with_options,
    read_rst, read_rst_with_options,
};
pub use string_table::{ContentInterner, StringPool};
pub use table::{ReplaceResult, RstTable};
pub use version::{Metadata, RstVersion};
pub use writer::{RstWriter, serialize_rst, write_rst};

/// "RST" magic signature
pub const RST_MAGIC: &[u8; 3] = b"RST";

/// Size of each hash index entry
pub const INDEX_ENTRY_SIZE: usize = 8;

/// File extension for binary string tables
pub const RST_EXTENSION: &str = "stringtable";
