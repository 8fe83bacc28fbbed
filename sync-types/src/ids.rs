//! Identity types for the dungeon rollup.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec;
use crate::FormatError;

/// Opaque identifier of a player / signing identity.
///
/// Used verbatim as a key-path segment (`/players/<id>/...`) and as the
/// prefix of every operation payload, so it may contain neither `/` nor
/// the payload separator `-`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Validate and wrap an account identifier.
    pub fn parse(id: &str) -> Result<Self, FormatError> {
        if id.is_empty()
            || id.contains('/')
            || id.contains(crate::SEPARATOR)
            || id.chars().any(char::is_whitespace)
        {
            return Err(FormatError::InvalidAccount(id.to_string()));
        }
        Ok(Self(id.to_string()))
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl std::str::FromStr for AccountId {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

/// Item code as stored in inventories and used as marketplace item keys.
///
/// Shares its byte values with the item-bearing [`crate::TileCode`]s.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemCode(u8);

impl ItemCode {
    /// A sword.
    pub const SWORD: ItemCode = ItemCode(0x01);
    /// A potion.
    pub const POTION: ItemCode = ItemCode(0x02);

    /// Wrap a raw item byte.
    pub fn new(code: u8) -> Self {
        Self(code)
    }

    /// Decode from a 2-character hex key (`"01"`).
    pub fn from_hex(hex: &str) -> Result<Self, FormatError> {
        codec::decode_byte(hex).map(Self)
    }

    /// Encode as a 2-character hex key.
    pub fn to_hex(&self) -> String {
        codec::pad2(self.0)
    }

    /// Get the raw byte.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Human-readable item name.
    pub fn name(&self) -> &'static str {
        match *self {
            Self::SWORD => "sword",
            Self::POTION => "potion",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ItemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for ItemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemCode({:02x})", self.0)
    }
}
