// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hardware addresses of radio devices
//!
//! An [`Address`] is the 6-byte station MAC the radio uses to identify a
//! device. It is printed and parsed in the usual `aa:bb:cc:dd:ee:ff` form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of bytes in a hardware address
pub const ADDRESS_LEN: usize = 6;

/// Fixed-width hardware identifier of a radio device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Broadcast address accepted by every device in range
    pub const BROADCAST: Address = Address([0xFF; ADDRESS_LEN]);

    /// Create an address from raw bytes
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes, in transmission order
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Whether this is the broadcast address
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; ADDRESS_LEN] {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = AddressParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressParseError::WrongLength(bytes.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    /// Parse `aa:bb:cc:dd:ee:ff` (or dash separated) hex notation
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let separator = if s.contains('-') { '-' } else { ':' };

        let mut bytes = [0u8; ADDRESS_LEN];
        let mut count = 0;
        for part in s.split(separator) {
            if count == ADDRESS_LEN {
                return Err(AddressParseError::WrongLength(count + 1));
            }
            if part.len() != 2 {
                return Err(AddressParseError::InvalidOctet(part.to_string()));
            }
            bytes[count] = u8::from_str_radix(part, 16)
                .map_err(|_| AddressParseError::InvalidOctet(part.to_string()))?;
            count += 1;
        }

        if count != ADDRESS_LEN {
            return Err(AddressParseError::WrongLength(count));
        }
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Failure to interpret text or bytes as an [`Address`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("expected {ADDRESS_LEN} octets, got {0}")]
    WrongLength(usize),

    #[error("invalid octet '{0}' (expected two hex digits)")]
    InvalidOctet(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_lowercase_colon_form() {
        let addr = Address::new([0x40, 0x4C, 0xCA, 0x4D, 0xDF, 0x80]);
        assert_eq!(addr.to_string(), "40:4c:ca:4d:df:80");
    }

    #[test]
    fn test_parse_accepts_both_separators() {
        let colon: Address = "40:4C:CA:4D:67:EC".parse().unwrap();
        let dash: Address = "40-4c-ca-4d-67-ec".parse().unwrap();
        assert_eq!(colon, dash);
        assert_eq!(colon.as_bytes(), &[0x40, 0x4C, 0xCA, 0x4D, 0x67, 0xEC]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            "40:4c:ca:4d:67".parse::<Address>(),
            Err(AddressParseError::WrongLength(5))
        );
        assert_eq!(
            "40:4c:ca:4d:67:ec:01".parse::<Address>(),
            Err(AddressParseError::WrongLength(7))
        );
        assert!(matches!(
            "40:4c:ca:4d:67:zz".parse::<Address>(),
            Err(AddressParseError::InvalidOctet(_))
        ));
        assert!(matches!(
            "404c:ca:4d:67:ec".parse::<Address>(),
            Err(AddressParseError::InvalidOctet(_))
        ));
    }

    #[test]
    fn test_try_from_slice() {
        let bytes = [1u8, 2, 3, 4, 5, 6];
        let addr = Address::try_from(&bytes[..]).unwrap();
        assert_eq!(<[u8; 6]>::from(addr), bytes);
        assert_eq!(
            Address::try_from(&bytes[..4]),
            Err(AddressParseError::WrongLength(4))
        );
    }

    #[test]
    fn test_serde_uses_text_form() {
        let addr = Address::new([0x56, 0x78, 0x12, 0xFE, 0x4A, 0x5B]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"56:78:12:fe:4a:5b\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_broadcast() {
        assert!(Address::BROADCAST.is_broadcast());
        assert!(!Address::default().is_broadcast());
    }
}
