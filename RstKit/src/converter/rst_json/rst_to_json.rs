//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! RST to JSON conversion

use std::borrow::Cow;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::document::{RstJsonDocument, format_key};
use crate::converter::{ConvertOptions, ConvertPhase, ConvertProgress, ConvertProgressCallback};
use crate::error::{Error, Result};
use crate::formats::rst::{self, ReadOptions, RstTable};
use crate::hashes::HashNames;

/// Convert a `.stringtable` file to JSON
///
/// # Errors
/// Returns an error if reading or conversion fails.
pub fn convert_rst_to_json<P: AsRef<Path>>(source: P, dest: P, names: &HashNames) -> Result<()> {
    convert_rst_to_json_with_progress(source, dest, names, &ConvertOptions::default(), &|_| {})
}

/// Convert a `.stringtable` file to JSON with progress callback
///
/// # Errors
/// Returns an error if reading or conversion fails.
pub fn convert_rst_to_json_with_progress<P: AsRef<Path>>(
    source: P,
    dest: P,
    names: &HashNames,
    options: &ConvertOptions,
    progress: ConvertProgressCallback,
) -> Result<()> {
    tracing::info!(
        "Converting RST→JSON: {:?} → {:?}",
        source.as_ref(),
        dest.as_ref()
    );

    progress(&ConvertProgress::with_file(
        ConvertPhase::ReadingSource,
        1,
        3,
        "Reading string table...",
    ));
    let read_options = ReadOptions::with_v5_variant(options.v5_variant);
    let table = rst::read_rst_with_options(&source, &read_options)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::Converting,
        2,
        3,
        format!("Converting {} entries to JSON...", table.len()),
    ));
    let json = to_json(&table, names)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::WritingOutput,
        3,
        3,
        "Writing JSON file...",
    ));
    crate::converter::write_output(dest.as_ref(), json.as_bytes())?;

    progress(&ConvertProgress::new(ConvertPhase::Complete, 3, 3));
    tracing::info!("Conversion complete");
    Ok(())
}

pub(crate) fn rst_bytes_to_json_file(
    data: &[u8],
    dest: &Path,
    names: &HashNames,
    options: ConvertOptions,
) -> Result<()> {
    let read_options = ReadOptions::with_v5_variant(options.v5_variant);
    let table = rst::parse_rst_bytes_with_options(data, &read_options)?;
    let json = to_json(&table, names)?;
    crate::converter::write_output(dest, json.as_bytes())
}

/// Convert an `RstTable` to a JSON string
///
/// Entries are sorted by their written key so output diffs cleanly.
///
/// # Errors
/// Returns an error if JSON serialization fails.
pub fn to_json(table: &RstTable, names: &HashNames) -> Result<String> {
    let algorithm = table.hash_algorithm();

    let mut keyed: Vec<(Cow<'_, str>, &str)> = table
        .iter()
        .map(|(hash, text)| (format_key(hash, names.resolve(hash, algorithm)), text))
        .collect();
    keyed.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let entries: IndexMap<String, String> = keyed
        .into_iter()
        .map(|(key, text)| (key.into_owned(), text.to_string()))
        .collect();

    let document = RstJsonDocument {
        version: Some(table.version().as_str().to_string()),
        config: table
            .font_config()
            .filter(|config| !config.is_empty())
            .map(str::to_string),
        entries: Some(entries),
    };

    let mut output = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut output, PrettyFormatter::with_indent(b"\t"));
    document.serialize(&mut serializer)?;
    output.push(b'\n');

    String::from_utf8(output).map_err(|e| Error::InvalidFormat(e.to_string()))
}
