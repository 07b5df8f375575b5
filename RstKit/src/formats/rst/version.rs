//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! RST layout variants and per-table metadata
//!
//! The version byte alone does not identify a layout: every version 5
//! variant writes `5`. The variant is carried explicitly as [`RstVersion`]
//! and spelled out by name in JSON documents.

use std::fmt;
use std::str::FromStr;

use super::hash::HashAlgorithm;
use crate::error::{Error, Result};

/// One of the six known string table layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RstVersion {
    V2,
    V3,
    V4,
    /// Version 5 before patch 14.15
    V5Legacy,
    /// Version 5 from patch 14.15 up to 15.2
    V5Patch1415,
    /// Version 5 from patch 15.2 onward
    #[default]
    V5Patch1502,
}

impl RstVersion {
    /// All layouts, oldest first
    pub const ALL: [Self; 6] = [
        Self::V2,
        Self::V3,
        Self::V4,
        Self::V5Legacy,
        Self::V5Patch1415,
        Self::V5Patch1502,
    ];

    /// The newest layout, used when nothing else is specified
    pub const LATEST: Self = Self::V5Patch1502;

    /// Version byte written after the magic
    #[must_use]
    pub fn byte(self) -> u8 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
            Self::V5Legacy | Self::V5Patch1415 | Self::V5Patch1502 => 5,
        }
    }

    /// Resolve a version byte.
    ///
    /// Version 5 is ambiguous on disk; `v5_variant` picks which version 5
    /// layout the byte maps to and must itself be a version 5 layout.
    pub fn from_byte(byte: u8, v5_variant: Self) -> Result<Self> {
        match byte {
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            5 => v5_variant.require_v5(),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }

    /// Whether this is one of the layouts sharing version byte 5
    #[must_use]
    pub fn is_v5(self) -> bool {
        self.byte() == 5
    }

    /// `self` if it is a version 5 layout
    pub fn require_v5(self) -> Result<Self> {
        if self.is_v5() {
            Ok(self)
        } else {
            Err(Error::InvalidArgument(format!(
                "{self} is not a version 5 layout"
            )))
        }
    }

    /// Canonical name used in JSON documents
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V2 => "v2",
            Self::V3 => "v3",
            Self::V4 => "v4",
            Self::V5Legacy => "v5-legacy",
            Self::V5Patch1415 => "v5-patch1415",
            Self::V5Patch1502 => "v5-patch1502",
        }
    }

    #[must_use]
    pub fn hash_algorithm(self) -> HashAlgorithm {
        match self {
            Self::V2 | Self::V3 => HashAlgorithm::XXHASH64_40,
            Self::V4 | Self::V5Legacy => HashAlgorithm::XXHASH64_39,
            Self::V5Patch1415 => HashAlgorithm::XXHASH3_39,
            Self::V5Patch1502 => HashAlgorithm::XXHASH3_38,
        }
    }

    /// Only version 2 stores a font config string in its header
    #[must_use]
    pub fn has_font_config(self) -> bool {
        self == Self::V2
    }

    /// Versions before 5 write a padding byte after the index block
    #[must_use]
    pub fn has_index_padding(self) -> bool {
        self.byte() < 5
    }
}

impl fmt::Display for RstVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RstVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "latest" => Ok(Self::LATEST),
            name => Self::ALL
                .into_iter()
                .find(|v| v.as_str() == name)
                .ok_or_else(|| Error::UnsupportedVersionName(s.to_string())),
        }
    }
}

/// Layout and header data carried by a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    version: RstVersion,
    font_config: Option<String>,
}

impl Metadata {
    #[must_use]
    pub fn new(version: RstVersion) -> Self {
        Self {
            version,
            font_config: None,
        }
    }

    /// Version 2 metadata with an embedded font config
    #[must_use]
    pub fn v2_with_font_config(font_config: impl Into<String>) -> Self {
        Self {
            version: RstVersion::V2,
            font_config: Some(font_config.into()),
        }
    }

    #[must_use]
    pub fn version(&self) -> RstVersion {
        self.version
    }

    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.version.hash_algorithm()
    }

    /// Font config string; always `None` for versions other than 2
    #[must_use]
    pub fn font_config(&self) -> Option<&str> {
        if self.version.has_font_config() {
            self.font_config.as_deref()
        } else {
            None
        }
    }

    /// Set the font config. Ignored for versions other than 2.
    pub fn set_font_config(&mut self, font_config: Option<String>) {
        if self.version.has_font_config() {
            self.font_config = font_config;
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new(RstVersion::LATEST)
    }
}

impl From<RstVersion> for Metadata {
    fn from(version: RstVersion) -> Self {
        Self::new(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_names_are_bijective() {
        for version in RstVersion::ALL {
            assert_eq!(version.as_str().parse::<RstVersion>().unwrap(), version);
        }
        assert_eq!("latest".parse::<RstVersion>().unwrap(), RstVersion::V5Patch1502);
        assert_eq!("V5-Legacy".parse::<RstVersion>().unwrap(), RstVersion::V5Legacy);
        assert!(matches!(
            "v6".parse::<RstVersion>(),
            Err(Error::UnsupportedVersionName(_))
        ));
    }

    #[test]
    fn test_golden_keys_per_version() {
        // Keys for [hello, world, game_character_displayname_Ahri, sword]
        const XXH64_40: [u64; 4] = [0x7d889f6da3, 0xfe66ee51ef, 0x476dcc54cc, 0x61758ef82e];
        const XXH64_39: [u64; 4] = [0x7d889f6da3, 0x7e66ee51ef, 0x476dcc54cc, 0x61758ef82e];
        const XXH3_39: [u64; 4] = [0x555c62dcfd, 0x25083d69be, 0x12f6939df2, 0x38c5699b94];
        const XXH3_38: [u64; 4] = [0x155c62dcfd, 0x25083d69be, 0x12f6939df2, 0x38c5699b94];

        let expected = [
            (RstVersion::V2, XXH64_40),
            (RstVersion::V3, XXH64_40),
            (RstVersion::V4, XXH64_39),
            (RstVersion::V5Legacy, XXH64_39),
            (RstVersion::V5Patch1415, XXH3_39),
            (RstVersion::V5Patch1502, XXH3_38),
        ];
        let names = ["hello", "world", "game_character_displayname_Ahri", "sword"];

        for (version, keys) in expected {
            let algorithm = version.hash_algorithm();
            for (name, key) in names.iter().zip(keys) {
                assert_eq!(algorithm.hash(name), key, "{version} {name}");
            }
        }
    }

    #[test]
    fn test_version_bytes() {
        assert_eq!(
            RstVersion::from_byte(2, RstVersion::LATEST).unwrap(),
            RstVersion::V2
        );
        assert_eq!(
            RstVersion::from_byte(5, RstVersion::V5Legacy).unwrap(),
            RstVersion::V5Legacy
        );
        assert!(matches!(
            RstVersion::from_byte(5, RstVersion::V3),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            RstVersion::from_byte(6, RstVersion::LATEST),
            Err(Error::UnsupportedVersion(6))
        ));
        assert!(matches!(
            RstVersion::from_byte(1, RstVersion::LATEST),
            Err(Error::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn test_algorithm_table() {
        assert_eq!(RstVersion::V2.hash_algorithm().mask_bits(), 40);
        assert_eq!(RstVersion::V3.hash_algorithm().mask_bits(), 40);
        assert_eq!(RstVersion::V4.hash_algorithm().mask_bits(), 39);
        assert_eq!(RstVersion::V5Legacy.hash_algorithm(), HashAlgorithm::XXHASH64_39);
        assert_eq!(RstVersion::V5Patch1415.hash_algorithm(), HashAlgorithm::XXHASH3_39);
        assert_eq!(RstVersion::V5Patch1502.hash_algorithm(), HashAlgorithm::XXHASH3_38);
    }

    #[test]
    fn test_font_config_only_for_v2() {
        let v2 = Metadata::v2_with_font_config("cfg");
        assert_eq!(v2.font_config(), Some("cfg"));

        let mut v3 = Metadata::new(RstVersion::V3);
        v3.set_font_config(Some("cfg".to_string()));
        assert_eq!(v3.font_config(), None);
    }
}
