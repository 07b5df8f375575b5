//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! RST and JSON string table conversions
//!
//! Handles conversions between the binary `.stringtable` format and its
//! JSON document form. Entry keys are written as names when a
//! [`HashNames`](crate::hashes::HashNames) lookup resolves them and as bare
//! hex otherwise.

mod document;
mod json_to_rst;
mod rst_to_json;

pub use document::{RstJsonDocument, format_key, parse_key, strip_comments};
pub use json_to_rst::{convert_json_to_rst, convert_json_to_rst_with_progress, from_json};
pub use rst_to_json::{convert_rst_to_json, convert_rst_to_json_with_progress, to_json};

pub(crate) use json_to_rst::json_bytes_to_rst_file;
pub(crate) use rst_to_json::rst_bytes_to_json_file;

/// File extension for JSON string tables
pub const JSON_EXTENSION: &str = "json";
