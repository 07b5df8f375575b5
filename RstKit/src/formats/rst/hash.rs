//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! String table key hashing
//!
//! Every RST layout keys its entries with a 64-bit hash of the lower-cased
//! entry name. Only the low `mask_bits` bits are the key; the bits above
//! the mask carry the content offset in the on-disk index.
//!
//! | Layout              | Function  | Mask bits | Trim        |
//! |---------------------|-----------|-----------|-------------|
//! | v2, v3              | `XxHash64`| 40        | none        |
//! | v4, v5 (pre-14.15)  | `XxHash64`| 39        | none        |
//! | v5 (14.15 - 15.2)   | `XxHash3` | 39        | high 3 bytes|
//! | v5 (15.2+)          | `XxHash3` | 38        | high 3 bytes|

use std::fmt;

use xxhash_rust::xxh3::xxh3_64;
use xxhash_rust::xxh64::xxh64;

use crate::error::{Error, Result};

/// Underlying 64-bit hash function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFunction {
    /// xxHash64 with seed 0
    XxHash64,
    /// XXH3 64-bit with the default secret
    XxHash3,
}

impl HashFunction {
    /// Hash raw bytes with this function
    #[must_use]
    pub fn compute(self, bytes: &[u8]) -> u64 {
        match self {
            Self::XxHash64 => xxh64(bytes, 0),
            Self::XxHash3 => xxh3_64(bytes),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::XxHash64 => "xxhash64",
            Self::XxHash3 => "xxhash3",
        }
    }
}

/// Post-mask transform applied to a hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashTrim {
    /// Masked hash is used as is
    None,
    /// Rebuild the key from little-endian bytes 4..=0, dropping bytes 5..=7
    TrimHigh3Bytes,
}

impl HashTrim {
    /// Apply the transform to an already masked hash
    #[must_use]
    pub fn apply(self, hash: u64) -> u64 {
        match self {
            Self::None => hash,
            Self::TrimHigh3Bytes => {
                let bytes = hash.to_le_bytes();
                bytes[..4]
                    .iter()
                    .rev()
                    .fold(u64::from(bytes[4]), |acc, &b| (acc << 8) | u64::from(b))
            }
        }
    }
}

/// A complete key hashing scheme: function, mask width and trim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashAlgorithm {
    function: HashFunction,
    mask_bits: u8,
    trim: HashTrim,
}

impl HashAlgorithm {
    /// v2 and v3 tables
    pub const XXHASH64_40: Self = Self::new(HashFunction::XxHash64, 40, HashTrim::None);
    /// v4 and pre-14.15 v5 tables
    pub const XXHASH64_39: Self = Self::new(HashFunction::XxHash64, 39, HashTrim::None);
    /// v5 tables written by patches 14.15 up to 15.2
    pub const XXHASH3_39: Self = Self::new(HashFunction::XxHash3, 39, HashTrim::TrimHigh3Bytes);
    /// v5 tables written by patch 15.2 and later
    pub const XXHASH3_38: Self = Self::new(HashFunction::XxHash3, 38, HashTrim::TrimHigh3Bytes);

    /// Every distinct scheme used by a known layout
    pub const ALL: [Self; 4] = [
        Self::XXHASH64_40,
        Self::XXHASH64_39,
        Self::XXHASH3_39,
        Self::XXHASH3_38,
    ];

    const fn new(function: HashFunction, mask_bits: u8, trim: HashTrim) -> Self {
        Self {
            function,
            mask_bits,
            trim,
        }
    }

    #[must_use]
    pub fn function(self) -> HashFunction {
        self.function
    }

    /// Number of low bits that make up the key
    #[must_use]
    pub fn mask_bits(self) -> u8 {
        self.mask_bits
    }

    #[must_use]
    pub fn trim(self) -> HashTrim {
        self.trim
    }

    /// Number of high bits left for the packed content offset
    #[must_use]
    pub fn offset_bits(self) -> u8 {
        64 - self.mask_bits
    }

    /// `(1 << mask_bits) - 1`
    #[must_use]
    pub fn mask(self) -> u64 {
        (1u64 << self.mask_bits) - 1
    }

    /// Hash an entry name.
    ///
    /// The name is lower-cased with Unicode default case mapping (no locale
    /// rules) before hashing its UTF-8 bytes.
    #[must_use]
    pub fn hash(self, text: &str) -> u64 {
        self.hash_bytes(text.to_lowercase().as_bytes())
    }

    /// Hash raw bytes without any normalization
    #[must_use]
    pub fn hash_bytes(self, bytes: &[u8]) -> u64 {
        let raw = self.function.compute(bytes);
        self.trim.apply(raw & self.mask())
    }

    /// Hash an entry name and pack a content offset above the key
    pub fn hash_with_offset(self, text: &str, offset: i64) -> Result<u64> {
        let offset = u64::try_from(offset).map_err(|_| Error::NegativeOffset(offset))?;
        Ok(self.with_offset(self.hash(text), offset))
    }

    /// Hash raw bytes and pack a content offset above the key
    pub fn hash_bytes_with_offset(self, bytes: &[u8], offset: i64) -> Result<u64> {
        let offset = u64::try_from(offset).map_err(|_| Error::NegativeOffset(offset))?;
        Ok(self.with_offset(self.hash_bytes(bytes), offset))
    }

    /// `hash + (offset << mask_bits)`.
    ///
    /// Offset bits that do not fit above the mask are shifted out; use
    /// [`HashAlgorithm::pack`] when the offset has to be validated.
    #[must_use]
    pub fn with_offset(self, hash: u64, offset: u64) -> u64 {
        hash.wrapping_add(offset << self.mask_bits)
    }

    /// Pack a content offset above `hash`, failing if it does not fit
    pub fn pack(self, hash: u64, offset: u64) -> Result<u64> {
        if offset >> self.offset_bits() != 0 {
            return Err(Error::OffsetOverflow {
                offset,
                bits: self.offset_bits(),
            });
        }
        Ok(self.with_offset(hash & self.mask(), offset))
    }

    /// Split an index entry into `(hash, content_offset)`
    #[must_use]
    pub fn unpack(self, raw: u64) -> (u64, u64) {
        (raw & self.mask(), raw >> self.mask_bits)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.function.as_str(), self.mask_bits)?;
        if self.trim == HashTrim::TrimHigh3Bytes {
            write!(f, " (trimmed)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underlying_vectors() {
        assert_eq!(HashFunction::XxHash64.compute(b""), 0xef46db3751d8e999);
        assert_eq!(HashFunction::XxHash3.compute(b""), 0x2d06800538d394c2);
        assert_eq!(HashFunction::XxHash64.compute(b"hello"), 0x26c7827d889f6da3);
        assert_eq!(HashFunction::XxHash3.compute(b"hello"), 0x9555e8555c62dcfd);
    }

    #[test]
    fn test_known_keys() {
        assert_eq!(HashAlgorithm::XXHASH64_40.hash("hello"), 0x7d889f6da3);
        assert_eq!(HashAlgorithm::XXHASH64_39.hash("hello"), 0x7d889f6da3);
        assert_eq!(HashAlgorithm::XXHASH3_39.hash("hello"), 0x555c62dcfd);
        assert_eq!(HashAlgorithm::XXHASH3_38.hash("hello"), 0x155c62dcfd);

        assert_eq!(HashAlgorithm::XXHASH64_40.hash("world"), 0xfe66ee51ef);
        assert_eq!(HashAlgorithm::XXHASH64_39.hash("world"), 0x7e66ee51ef);
        assert_eq!(HashAlgorithm::XXHASH3_39.hash("world"), 0x25083d69be);
        assert_eq!(HashAlgorithm::XXHASH3_38.hash("world"), 0x25083d69be);
    }

    #[test]
    fn test_hash_lowercases_names() {
        let name = "game_character_displayname_Ahri";
        assert_eq!(HashAlgorithm::XXHASH64_40.hash(name), 0x476dcc54cc);
        assert_eq!(HashAlgorithm::XXHASH64_39.hash(name), 0x476dcc54cc);
        assert_eq!(HashAlgorithm::XXHASH3_39.hash(name), 0x12f6939df2);
        assert_eq!(HashAlgorithm::XXHASH3_38.hash(name), 0x12f6939df2);
        assert_eq!(
            HashAlgorithm::XXHASH3_38.hash(name),
            HashAlgorithm::XXHASH3_38.hash(&name.to_uppercase())
        );
        // Raw bytes are not normalized
        assert_ne!(
            HashAlgorithm::XXHASH3_38.hash_bytes(name.as_bytes()),
            HashAlgorithm::XXHASH3_38.hash(name)
        );
    }

    #[test]
    fn test_mask_is_respected() {
        for algorithm in HashAlgorithm::ALL {
            for name in ["", "a", "hello", "item_1001_name", "Straße"] {
                let high_bits = algorithm.hash(name) & !algorithm.mask();
                assert_eq!(high_bits, 0, "{algorithm} {name}");
            }
        }
    }

    #[test]
    fn test_trim_keeps_low_five_bytes() {
        let hash = 0x1122_3344_5566_7788;
        assert_eq!(HashTrim::TrimHigh3Bytes.apply(hash), 0x44_5566_7788);
        assert_eq!(HashTrim::None.apply(hash), hash);
    }

    #[test]
    fn test_offset_packing_round_trip() {
        for algorithm in HashAlgorithm::ALL {
            let hash = algorithm.hash("hello");
            let max = (1u64 << algorithm.offset_bits()) - 1;
            for offset in [0, 1, 3, 1000, max] {
                let packed = algorithm.pack(hash, offset).unwrap();
                assert_eq!(algorithm.unpack(packed), (hash, offset));
            }
            assert!(matches!(
                algorithm.pack(hash, max + 1),
                Err(Error::OffsetOverflow { .. })
            ));
        }
    }

    #[test]
    fn test_hash_with_offset() {
        let algorithm = HashAlgorithm::XXHASH3_38;
        let packed = algorithm.hash_with_offset("hello", 5).unwrap();
        assert_eq!(packed, 0x155c62dcfd + (5u64 << 38));
        assert!(matches!(
            algorithm.hash_with_offset("hello", -1),
            Err(Error::NegativeOffset(-1))
        ));
        assert!(algorithm.hash_bytes_with_offset(b"hello", 0).is_ok());
    }
}
