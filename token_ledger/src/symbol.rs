//! Ticker codes and symbols (ticker + decimal precision)
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::asset::AssetError;

/// Largest number of decimal places a symbol may declare
pub const MAX_PRECISION: u8 = 18;

/// Longest ticker code
pub const MAX_CODE_LEN: usize = 7;

/// Up to seven uppercase ASCII letters packed little-endian into a u64
#[derive(Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct SymbolCode(u64);

impl SymbolCode {
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// A code is valid when it holds one to seven letters A-Z with no gaps
    pub fn is_valid(&self) -> bool {
        let bytes = self.0.to_le_bytes();
        let len = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        if len == 0 || len > MAX_CODE_LEN {
            return false;
        }
        bytes[..len].iter().all(u8::is_ascii_uppercase) && bytes[len..].iter().all(|b| *b == 0)
    }

    pub fn len(&self) -> usize {
        self.0.to_le_bytes().iter().take_while(|b| **b != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for SymbolCode {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > MAX_CODE_LEN || !s.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(AssetError::InvalidSymbol);
        }
        let value = s.bytes().rev().fold(0u64, |acc, b| (acc << 8) | b as u64);
        Ok(Self(value))
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.to_le_bytes().iter().take_while(|b| **b != 0) {
            write!(f, "{}", *b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolCode({})", self)
    }
}

/// A ticker code plus the number of decimal places its amounts carry
///
/// Packed as `code << 8 | precision`. Two symbols are equal only when both parts match.
#[derive(Serialize, Deserialize, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Symbol(u64);

impl Symbol {
    pub fn new(code: SymbolCode, precision: u8) -> Self {
        Self((code.raw() << 8) | precision as u64)
    }

    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub fn precision(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn code(&self) -> SymbolCode {
        SymbolCode(self.0 >> 8)
    }

    pub fn is_valid(&self) -> bool {
        self.precision() <= MAX_PRECISION && self.code().is_valid()
    }
}

impl FromStr for Symbol {
    type Err = AssetError;

    /// Parses the `precision,CODE` form, e.g. `4,EOS`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (precision, code) = s.trim().split_once(',').ok_or(AssetError::InvalidSymbol)?;
        let precision: u8 = precision.trim().parse().map_err(|_| AssetError::InvalidSymbol)?;
        if precision > MAX_PRECISION {
            return Err(AssetError::InvalidSymbol);
        }
        Ok(Symbol::new(code.trim().parse()?, precision))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision(), self.code())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}
