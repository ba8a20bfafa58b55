//! 64-bit account names and their base-32 text form
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Longest text form of a name: twelve 5-bit characters and a final 4-bit character
pub const MAX_NAME_LEN: usize = 13;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("name {0:?} is longer than 13 characters")]
    TooLong(String),
    #[error("name {name:?} contains invalid character {character:?}")]
    InvalidCharacter { name: String, character: char },
    #[error("thirteenth character of name {0:?} must be in [.1-5a-j]")]
    InvalidLastCharacter(String),
}

/// An account identifier packed into a u64
///
/// Serializes as the raw integer in both state and action data.
#[derive(
    Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct AccountName(u64);

impl AccountName {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

fn char_to_value(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64 + 6),
        b'1'..=b'5' => Some((c - b'1') as u64 + 1),
        b'.' => Some(0),
        _ => None,
    }
}

impl FromStr for AccountName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_NAME_LEN {
            return Err(NameError::TooLong(s.to_string()));
        }

        let mut value = 0u64;
        for (i, c) in s.bytes().enumerate() {
            let v = char_to_value(c).ok_or_else(|| NameError::InvalidCharacter {
                name: s.to_string(),
                character: c as char,
            })?;
            if i < 12 {
                value |= v << (64 - 5 * (i + 1));
            } else {
                if v > 0x0f {
                    return Err(NameError::InvalidLastCharacter(s.to_string()));
                }
                value |= v;
            }
        }
        Ok(Self(value))
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; MAX_NAME_LEN];
        let mut tmp = self.0;
        for i in 0..MAX_NAME_LEN {
            let mask = if i == 0 { 0x0f } else { 0x1f };
            out[12 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= if i == 0 { 4 } else { 5 };
        }
        let len = out.iter().rposition(|c| *c != b'.').map_or(0, |p| p + 1);
        // every byte comes from CHARMAP so this is always ascii
        f.write_str(std::str::from_utf8(&out[..len]).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountName({})", self)
    }
}

impl From<u64> for AccountName {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<AccountName> for u64 {
    fn from(name: AccountName) -> Self {
        name.0
    }
}
