//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! JSON to RST conversion

use std::path::Path;

use super::document::{RstJsonDocument, parse_key, strip_comments};
use crate::converter::{ConvertOptions, ConvertPhase, ConvertProgress, ConvertProgressCallback};
use crate::error::{Error, Result};
use crate::formats::rst::{Metadata, RstTable, RstVersion, RstWriter};

/// Convert a JSON string table to `.stringtable`
///
/// # Errors
/// Returns an error if reading, parsing or writing fails.
pub fn convert_json_to_rst<P: AsRef<Path>>(
    source: P,
    dest: P,
    version_override: Option<RstVersion>,
) -> Result<()> {
    let options = ConvertOptions {
        version_override,
        ..ConvertOptions::default()
    };
    convert_json_to_rst_with_progress(source, dest, &options, &|_| {})
}

/// Convert a JSON string table to `.stringtable` with progress callback
///
/// # Errors
/// Returns an error if reading, parsing or writing fails.
pub fn convert_json_to_rst_with_progress<P: AsRef<Path>>(
    source: P,
    dest: P,
    options: &ConvertOptions,
    progress: ConvertProgressCallback,
) -> Result<()> {
    tracing::info!(
        "Converting JSON→RST: {:?} → {:?}",
        source.as_ref(),
        dest.as_ref()
    );

    progress(&ConvertProgress::with_file(
        ConvertPhase::ReadingSource,
        1,
        3,
        "Reading JSON file...",
    ));
    let content = std::fs::read_to_string(&source)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::Converting,
        2,
        3,
        "Parsing JSON document...",
    ));
    let table = from_json(&content, options.version_override)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::WritingOutput,
        3,
        3,
        format!("Writing {} entries...", table.len()),
    ));
    RstWriter::new(&table)?.write_file(dest)?;

    progress(&ConvertProgress::new(ConvertPhase::Complete, 3, 3));
    tracing::info!("Conversion complete");
    Ok(())
}

pub(crate) fn json_bytes_to_rst_file(
    data: &[u8],
    dest: &Path,
    options: ConvertOptions,
) -> Result<()> {
    let content = std::str::from_utf8(data)
        .map_err(|e| Error::InvalidFormat(format!("JSON is not valid UTF-8: {e}")))?;
    let table = from_json(content, options.version_override)?;
    RstWriter::new(&table)?.write_file(dest)
}

/// Parse a JSON document into an `RstTable`
///
/// `version_override` takes precedence over the document's `version`
/// field. A document without a version is read as the latest layout.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] if the `entries` object is missing,
/// [`Error::UnsupportedVersionName`] for an unknown version and
/// [`Error::JsonError`] for malformed JSON.
pub fn from_json(content: &str, version_override: Option<RstVersion>) -> Result<RstTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let document: RstJsonDocument = serde_json::from_str(&strip_comments(content))?;

    let version = match (version_override, document.version.as_deref()) {
        (Some(version), _) => version,
        (None, Some(name)) => name.parse()?,
        (None, None) => {
            tracing::debug!(
                "No version in JSON document, assuming {}",
                RstVersion::LATEST
            );
            RstVersion::LATEST
        }
    };

    let entries = document
        .entries
        .ok_or_else(|| Error::InvalidFormat("missing \"entries\" object".into()))?;

    let mut metadata = Metadata::new(version);
    metadata.set_font_config(document.config.filter(|config| !config.is_empty()));

    let mut table = RstTable::new(metadata);
    let algorithm = table.hash_algorithm();
    for (key, text) in entries {
        let hash = parse_key(&key, algorithm)?;
        if table.insert(hash, text).is_some() {
            tracing::warn!(
                "Duplicate entry for key {key:?} ({hash:x}), keeping the last one"
            );
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entries() {
        assert!(matches!(
            from_json(r#"{"version": "v3"}"#, None),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_unknown_version() {
        assert!(matches!(
            from_json(r#"{"version": "v9", "entries": {}}"#, None),
            Err(Error::UnsupportedVersionName(_))
        ));
    }

    #[test]
    fn test_missing_version_is_latest() {
        let table = from_json(r#"{"entries": {"hello": "hi"}}"#, None).unwrap();
        assert_eq!(table.version(), RstVersion::V5Patch1502);
        assert_eq!(table.get(0x155c62dcfd), Some("hi"));
    }

    #[test]
    fn test_version_override() {
        let json = r#"{"version": "v3", "entries": {}}"#;
        let table = from_json(json, Some(RstVersion::V4)).unwrap();
        assert_eq!(table.version(), RstVersion::V4);
    }

    #[test]
    fn test_key_forms_and_comments() {
        let json = concat!(
            "\u{feff}{\n",
            "\t// comment\n",
            "\t\"version\": \"latest\",\n",
            "\t\"entries\": {\n",
            "\t\t\"world\": \"a\",\n",
            "\t\t\"{abc}\": \"b\", /* trailing */\n",
            "\t\t\"DEF\": \"c\"\n",
            "\t}\n",
            "}"
        );
        let table = from_json(json, None).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get_named("world"), Some("a"));
        assert_eq!(table.get(0xabc), Some("b"));
        assert_eq!(table.get(0xdef), Some("c"));
    }

    #[test]
    fn test_v2_config() {
        let v2 = r#"{"version": "v2", "config": "cfg", "entries": {}}"#;
        let table = from_json(v2, None).unwrap();
        assert_eq!(table.font_config(), Some("cfg"));

        let v3 = r#"{"version": "v3", "config": "cfg", "entries": {}}"#;
        let table = from_json(v3, None).unwrap();
        assert_eq!(table.font_config(), None);
    }
}
