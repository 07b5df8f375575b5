//! `.stringtable` file reading and parsing
//!
//! All reads go through a bounds-checked cursor: a truncated or corrupt
//! buffer fails with [`Error::OutOfRange`] instead of reading past the end.

use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use super::string_table::StringPool;
use super::table::RstTable;
use super::version::{Metadata, RstVersion};
use super::{INDEX_ENTRY_SIZE, RST_MAGIC};
use crate::error::{Error, Result};

/// Options controlling how ambiguous headers are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Layout assumed for version byte 5
    pub v5_variant: RstVersion,
}

impl ReadOptions {
    #[must_use]
    pub fn with_v5_variant(v5_variant: RstVersion) -> Self {
        Self { v5_variant }
    }
}

/// Header information computed once per read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProperties {
    pub metadata: Metadata,
    /// Number of index entries
    pub entry_count: usize,
    /// Absolute offset of the first index entry
    pub hashes_offset: usize,
    /// Absolute offset of the string content block
    pub content_offset: usize,
}

/// Cursor over a byte slice with an explicit position and capacity checks
struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = slice_at(self.data, self.pos, len)?;
        self.pos += len;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }
}

fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(Error::OutOfRange {
            offset,
            len,
            size: data.len(),
        })
}

fn read_length(cursor: &mut ByteCursor<'_>, what: &str) -> Result<usize> {
    let value = cursor.read_i32()?;
    usize::try_from(value)
        .map_err(|_| Error::InvalidFormat(format!("negative {what}: {value}")))
}

/// Parse the fixed header and locate the index and content blocks
fn read_properties(data: &[u8], options: ReadOptions) -> Result<FileProperties> {
    options.v5_variant.require_v5()?;
    let mut cursor = ByteCursor::new(data);

    let magic = cursor.take(RST_MAGIC.len())?;
    if magic != RST_MAGIC {
        return Err(Error::InvalidMagic([magic[0], magic[1], magic[2]]));
    }

    let version = RstVersion::from_byte(cursor.read_u8()?, options.v5_variant)?;
    let mut metadata = Metadata::new(version);

    if version.has_font_config() && cursor.read_u8()? != 0 {
        let len = read_length(&mut cursor, "font config length")?;
        let bytes = cursor.take(len)?;
        metadata.set_font_config(Some(String::from_utf8_lossy(bytes).into_owned()));
    }

    let entry_count = read_length(&mut cursor, "entry count")?;
    let hashes_offset = cursor.pos;

    let index_len = entry_count
        .checked_mul(INDEX_ENTRY_SIZE)
        .ok_or(Error::OutOfRange {
            offset: hashes_offset,
            len: usize::MAX,
            size: data.len(),
        })?;
    let padding = usize::from(version.has_index_padding());
    slice_at(data, hashes_offset, index_len + padding)?;
    let content_offset = hashes_offset + index_len + padding;

    tracing::debug!(
        "RST {} header: {} entries, index at {}, content at {}",
        version,
        entry_count,
        hashes_offset,
        content_offset
    );

    Ok(FileProperties {
        metadata,
        entry_count,
        hashes_offset,
        content_offset,
    })
}

/// Reader over a whole `.stringtable` file held in memory
pub struct RstReader<'a> {
    data: &'a [u8],
    properties: FileProperties,
    pool: StringPool,
}

impl<'a> RstReader<'a> {
    /// Parse the header of `data`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMagic`] if the data does not start with `RST`.
    /// Returns [`Error::UnsupportedVersion`] for an unknown version byte.
    /// Returns [`Error::OutOfRange`] if the header or index block is truncated.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Self::with_options(data, &ReadOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: &ReadOptions) -> Result<Self> {
        let properties = read_properties(data, *options)?;
        Ok(Self {
            data,
            properties,
            pool: StringPool::new(),
        })
    }

    #[must_use]
    pub fn properties(&self) -> &FileProperties {
        &self.properties
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.properties.metadata
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.entry_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.entry_count == 0
    }

    /// Raw 64-bit index values in file order
    pub fn raw_entries(&self) -> impl Iterator<Item = u64> + 'a {
        let start = self.properties.hashes_offset;
        let end = start + self.properties.entry_count * INDEX_ENTRY_SIZE;
        let data: &'a [u8] = self.data;
        data[start..end]
            .chunks_exact(INDEX_ENTRY_SIZE)
            .map(LittleEndian::read_u64)
    }

    /// Keys in file order, without touching the content block
    pub fn hashes(&self) -> impl Iterator<Item = u64> + 'a {
        let algorithm = self.properties.metadata.hash_algorithm();
        self.raw_entries().map(move |raw| algorithm.unpack(raw).0)
    }

    /// Decode the null-terminated string at `relative_offset` in the content block
    pub fn read_text(&mut self, relative_offset: u64) -> Result<String> {
        let data = self.data;
        let size = data.len();
        let start = usize::try_from(relative_offset)
            .ok()
            .and_then(|rel| rel.checked_add(self.properties.content_offset))
            .filter(|&start| start < size)
            .ok_or(Error::OutOfRange {
                offset: self.properties.content_offset,
                len: usize::try_from(relative_offset).unwrap_or(usize::MAX),
                size,
            })?;

        self.pool.get_or_decode(start, || {
            let rest = &data[start..];
            let len = rest.iter().position(|&b| b == 0).ok_or(Error::OutOfRange {
                offset: start,
                len: rest.len() + 1,
                size,
            })?;
            Ok(String::from_utf8_lossy(&rest[..len]).into_owned())
        })
    }

    /// `(hash, text)` pairs in file order
    pub fn entries(&mut self) -> Result<Vec<(u64, String)>> {
        let algorithm = self.properties.metadata.hash_algorithm();
        let raw: Vec<u64> = self.raw_entries().collect();

        let mut entries = Vec::with_capacity(raw.len());
        for value in raw {
            let (hash, offset) = algorithm.unpack(value);
            entries.push((hash, self.read_text(offset)?));
        }
        Ok(entries)
    }

    /// Materialize the whole file as a table
    pub fn read_table(mut self) -> Result<RstTable> {
        let entries = self.entries()?;
        let count = entries.len();
        let table = RstTable::from_entries(self.properties.metadata.clone(), entries);
        if table.len() != count {
            tracing::debug!("{} duplicate keys collapsed", count - table.len());
        }
        tracing::debug!(
            "Read {} entries ({} unique strings)",
            table.len(),
            self.pool.len()
        );
        Ok(table)
    }
}

/// Read a `.stringtable` file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read, and any
/// error of [`parse_rst_bytes`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn read_rst<P: AsRef<Path>>(path: P) -> Result<RstTable> {
    read_rst_with_options(path, &ReadOptions::default())
}

pub fn read_rst_with_options<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<RstTable> {
    let buffer = fs::read(path)?;
    parse_rst_bytes_with_options(&buffer, options)
}

/// Parse `.stringtable` data from bytes
///
/// # Errors
///
/// Returns [`Error::InvalidMagic`] if the data does not have a valid RST header.
/// Returns [`Error::UnsupportedVersion`] for an unknown version byte.
/// Returns [`Error::OutOfRange`] if the data is truncated.
pub fn parse_rst_bytes(data: &[u8]) -> Result<RstTable> {
    parse_rst_bytes_with_options(data, &ReadOptions::default())
}

pub fn parse_rst_bytes_with_options(data: &[u8], options: &ReadOptions) -> Result<RstTable> {
    RstReader::with_options(data, options)?.read_table()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v5_file(entries: &[u64], content: &[u8]) -> Vec<u8> {
        let mut data = b"RST\x05".to_vec();
        data.extend_from_slice(&(entries.len() as i32).to_le_bytes());
        for entry in entries {
            data.extend_from_slice(&entry.to_le_bytes());
        }
        data.extend_from_slice(content);
        data
    }

    #[test]
    fn test_bad_magic_fails_before_version() {
        assert!(matches!(
            parse_rst_bytes(&[0, 0, 0]),
            Err(Error::InvalidMagic([0, 0, 0]))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        assert!(matches!(
            parse_rst_bytes(b"RST\x07\x00\x00\x00\x00"),
            Err(Error::UnsupportedVersion(7))
        ));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(parse_rst_bytes(b"RS"), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            parse_rst_bytes(b"RST\x05\x01"),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_truncated_index() {
        let mut data = b"RST\x05".to_vec();
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(&[0u8; 12]);
        assert!(matches!(parse_rst_bytes(&data), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_negative_count() {
        let mut data = b"RST\x05".to_vec();
        data.extend_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(parse_rst_bytes(&data), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_reads_shared_content() {
        let algorithm = RstVersion::V5Patch1502.hash_algorithm();
        let data = v5_file(&[1, 2, algorithm.with_offset(3, 3)], b"hi\0yo\0");

        let table = parse_rst_bytes(&data).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1), Some("hi"));
        assert_eq!(table.get(2), Some("hi"));
        assert_eq!(table.get(3), Some("yo"));
    }

    #[test]
    fn test_content_offset_out_of_range() {
        let algorithm = RstVersion::V5Patch1502.hash_algorithm();
        let data = v5_file(&[algorithm.with_offset(1, 50)], b"hi\0");
        assert!(matches!(parse_rst_bytes(&data), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_missing_terminator() {
        let data = v5_file(&[1], b"hi");
        assert!(matches!(parse_rst_bytes(&data), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_lazy_hashes_skip_content() {
        let algorithm = RstVersion::V5Patch1502.hash_algorithm();
        // Content block is missing entirely; hash-only reads still work
        let data = v5_file(&[algorithm.with_offset(10, 99), 20], b"");
        let reader = RstReader::new(&data).unwrap();
        assert_eq!(reader.hashes().collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(reader.properties().content_offset, data.len());
    }

    #[test]
    fn test_padding_byte_ignored_on_read() {
        let mut data = b"RST\x03".to_vec();
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&7u64.to_le_bytes());
        data.push(0xAB); // padding with a junk value
        data.extend_from_slice(b"text\0");

        let reader = RstReader::new(&data).unwrap();
        assert_eq!(reader.properties().content_offset, 4 + 4 + 8 + 1);
        let table = reader.read_table().unwrap();
        assert_eq!(table.get(7), Some("text"));
    }

    #[test]
    fn test_v2_font_config() {
        let mut data = b"RST\x02\x01".to_vec();
        data.extend_from_slice(&3i32.to_le_bytes());
        data.extend_from_slice(b"cfg");
        data.extend_from_slice(&0i32.to_le_bytes());
        data.push(0);

        let table = parse_rst_bytes(&data).unwrap();
        assert_eq!(table.version(), RstVersion::V2);
        assert_eq!(table.font_config(), Some("cfg"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_v5_variant_option() {
        let data = v5_file(&[], b"");
        let options = ReadOptions::with_v5_variant(RstVersion::V5Legacy);
        let table = parse_rst_bytes_with_options(&data, &options).unwrap();
        assert_eq!(table.version(), RstVersion::V5Legacy);
        assert_eq!(parse_rst_bytes(&data).unwrap().version(), RstVersion::V5Patch1502);
    }

    #[test]
    fn test_v5_variant_must_be_v5() {
        let options = ReadOptions::with_v5_variant(RstVersion::V3);
        for data in [v5_file(&[], b""), b"RST\x03\x00\x00\x00\x00\x00".to_vec()] {
            assert!(matches!(
                parse_rst_bytes_with_options(&data, &options),
                Err(Error::InvalidArgument(_))
            ));
        }
    }
}
