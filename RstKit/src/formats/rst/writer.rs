//! `.stringtable` file writing
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Serialization produces two buffers: the header with the hash index,
//! and the deduplicated content block. They are written back to back and
//! never merged in memory.

use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tempfile::NamedTempFile;

use super::string_table::ContentInterner;
use super::table::RstTable;
use super::{INDEX_ENTRY_SIZE, RST_MAGIC};
use crate::error::{Error, Result};

/// Serialized form of a table, split into header/index and content
#[derive(Debug, Clone)]
pub struct RstWriter {
    header: Vec<u8>,
    content: Vec<u8>,
    entry_count: usize,
    unique_count: usize,
}

fn to_i32(value: usize, what: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| Error::InvalidFormat(format!("{what} too large: {value}")))
}

impl RstWriter {
    /// Serialize `table`
    ///
    /// Entries are written in ascending hash order so the same logical
    /// table always produces identical bytes.
    ///
    /// # Errors
    /// Returns [`Error::OffsetOverflow`] if the content block grows past
    /// what the index entries can address.
    pub fn new(table: &RstTable) -> Result<Self> {
        let metadata = table.metadata();
        let version = metadata.version();
        let algorithm = metadata.hash_algorithm();
        let entries = table.sorted_entries();

        let padding = usize::from(version.has_index_padding());
        let mut header = Vec::with_capacity(16 + entries.len() * INDEX_ENTRY_SIZE + padding);

        // Header
        header.write_all(RST_MAGIC)?;
        header.write_u8(version.byte())?;

        if version.has_font_config() {
            match metadata.font_config() {
                Some(config) => {
                    header.write_u8(1)?;
                    header.write_i32::<LittleEndian>(to_i32(config.len(), "font config")?)?;
                    header.write_all(config.as_bytes())?;
                }
                None => header.write_u8(0)?,
            }
        }

        header.write_i32::<LittleEndian>(to_i32(entries.len(), "entry count")?)?;

        // Index entries, content interned in first-seen order
        let content_len: usize = entries.iter().map(|(_, text)| text.len() + 1).sum();
        let mut interner = ContentInterner::with_capacity(entries.len(), content_len);
        for &(hash, text) in &entries {
            let offset = interner.intern(text);
            header.write_u64::<LittleEndian>(algorithm.pack(hash, offset)?)?;
        }

        if version.has_index_padding() {
            header.write_u8(0)?;
        }

        let unique_count = interner.len();
        let content = interner.into_content();

        tracing::debug!(
            "Serialized {} entries ({} unique strings): {} header bytes, {} content bytes",
            entries.len(),
            unique_count,
            header.len(),
            content.len()
        );

        Ok(Self {
            header,
            content,
            entry_count: entries.len(),
            unique_count,
        })
    }

    /// Header and hash index block
    #[must_use]
    pub fn header_bytes(&self) -> &[u8] {
        &self.header
    }

    /// Deduplicated, null-terminated string bodies
    #[must_use]
    pub fn content_bytes(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Number of distinct string bodies in the content block
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.unique_count
    }

    /// Total serialized size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.header.len() + self.content.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write header then content to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.header)?;
        writer.write_all(&self.content)?;
        Ok(())
    }

    /// Concatenate both buffers
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.header);
        bytes.extend_from_slice(&self.content);
        bytes
    }

    /// Write at `offset` of a seekable output, flushing after each region
    pub fn write_at<W: Write + Seek>(&self, output: &mut W, offset: u64) -> Result<()> {
        output.seek(SeekFrom::Start(offset))?;
        output.write_all(&self.header)?;
        output.flush()?;
        output.write_all(&self.content)?;
        output.flush()?;
        Ok(())
    }

    /// Write a complete file at `path`
    ///
    /// Data goes to a temporary file in the destination directory which
    /// then replaces `path`, so a failed write never leaves a partial file.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir)?;
        self.write_at(temp.as_file_mut(), 0)?;
        temp.as_file().sync_all()?;
        temp.persist(path)?;
        Ok(())
    }
}

/// Write a table to a `.stringtable` file on disk
///
/// # Errors
/// Returns an error if serialization or file writing fails.
pub fn write_rst<P: AsRef<Path>>(path: P, table: &RstTable) -> Result<()> {
    RstWriter::new(table)?.write_file(path)
}

/// Serialize a table into a single byte buffer
pub fn serialize_rst(table: &RstTable) -> Result<Vec<u8>> {
    Ok(RstWriter::new(table)?.to_bytes())
}
