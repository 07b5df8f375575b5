//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! String content management for RST files
//!
//! [`ContentInterner`] packs unique string bodies into the content block
//! when writing; [`StringPool`] decodes each content offset once when
//! reading. Both are scoped to a single read or write pass.

use std::collections::HashMap;

/// Deduplicating content block builder
///
/// Each distinct string body is appended once, null-terminated, in
/// first-seen order. Later occurrences resolve to the recorded offset.
#[derive(Debug, Clone, Default)]
pub struct ContentInterner<'a> {
    content: Vec<u8>,
    offsets: HashMap<&'a str, u64>,
}

impl<'a> ContentInterner<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an interner sized for `strings` unique bodies and `bytes` of content
    #[must_use]
    pub fn with_capacity(strings: usize, bytes: usize) -> Self {
        Self {
            content: Vec::with_capacity(bytes),
            offsets: HashMap::with_capacity(strings),
        }
    }

    /// Add a string body, returns its offset in the content block
    pub fn intern(&mut self, s: &'a str) -> u64 {
        if let Some(&offset) = self.offsets.get(s) {
            return offset;
        }

        let offset = self.content.len() as u64;
        self.content.extend_from_slice(s.as_bytes());
        self.content.push(0); // Null terminator
        self.offsets.insert(s, offset);
        offset
    }

    /// Offset of a previously interned body
    #[must_use]
    pub fn offset_of(&self, s: &str) -> Option<u64> {
        self.offsets.get(s).copied()
    }

    /// Content block built so far
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    /// Number of unique bodies
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Per-read cache of decoded strings keyed by content offset
#[derive(Debug, Clone, Default)]
pub struct StringPool {
    decoded: HashMap<usize, String>,
}

impl StringPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the string decoded at `offset`, decoding it with `decode` on first use
    pub fn get_or_decode<E>(
        &mut self,
        offset: usize,
        decode: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        if let Some(s) = self.decoded.get(&offset) {
            return Ok(s.clone());
        }
        let s = decode()?;
        self.decoded.insert(offset, s.clone());
        Ok(s)
    }

    /// Number of distinct offsets decoded
    #[must_use]
    pub fn len(&self) -> usize {
        self.decoded.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }

    pub fn clear(&mut self) {
        self.decoded.clear();
    }
}
