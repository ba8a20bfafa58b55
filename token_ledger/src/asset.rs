//! Fixed-point quantities bound to a symbol
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use fvm_ipld_encoding::tuple::*;
use thiserror::Error;

use crate::symbol::{Symbol, SymbolCode, MAX_PRECISION};

/// Largest magnitude an asset amount may hold, 2^62 - 1
///
/// Leaves headroom for intermediate multiplication in downstream logic.
pub const MAX_AMOUNT: i64 = (1 << 62) - 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("magnitude of asset amount must be less than 2^62")]
    AmountOutOfRange,
    #[error("invalid symbol name")]
    InvalidSymbol,
    #[error("attempt to {op} asset with different symbol")]
    SymbolMismatch { op: &'static str },
    #[error("{op} overflow")]
    Overflow { op: &'static str },
    #[error("{op} underflow")]
    Underflow { op: &'static str },
    #[error("invalid asset string {0:?}")]
    Malformed(String),
}

/// A signed quantity of `amount / 10^precision` units of the symbol's code
#[derive(Serialize_tuple, Deserialize_tuple, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    amount: i64,
    symbol: Symbol,
}

impl Asset {
    /// Constructs an asset, checking both the amount range and the symbol
    pub fn new(amount: i64, symbol: Symbol) -> Result<Self, AssetError> {
        if !symbol.is_valid() {
            return Err(AssetError::InvalidSymbol);
        }
        Self::from_parts(amount, symbol)
    }

    /// Constructs an asset checking only the amount range
    ///
    /// Used when decoding action data, where the symbol is checked later by the action itself.
    pub(crate) fn from_parts(amount: i64, symbol: Symbol) -> Result<Self, AssetError> {
        if !is_amount_within_range(amount) {
            return Err(AssetError::AmountOutOfRange);
        }
        Ok(Self { amount, symbol })
    }

    pub fn zero(symbol: Symbol) -> Self {
        Self { amount: 0, symbol }
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn is_amount_within_range(&self) -> bool {
        is_amount_within_range(self.amount)
    }

    pub fn is_valid(&self) -> bool {
        self.is_amount_within_range() && self.symbol.is_valid()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn checked_add(&self, other: &Asset) -> Result<Asset, AssetError> {
        const OP: &str = "addition";
        if self.symbol != other.symbol {
            return Err(AssetError::SymbolMismatch { op: "add" });
        }
        let amount = self.amount.checked_add(other.amount).ok_or(AssetError::Overflow { op: OP })?;
        check_bounds(amount, OP)?;
        Ok(Asset { amount, symbol: self.symbol })
    }

    pub fn checked_sub(&self, other: &Asset) -> Result<Asset, AssetError> {
        const OP: &str = "subtraction";
        if self.symbol != other.symbol {
            return Err(AssetError::SymbolMismatch { op: "subtract" });
        }
        let amount = self.amount.checked_sub(other.amount).ok_or(AssetError::Underflow { op: OP })?;
        check_bounds(amount, OP)?;
        Ok(Asset { amount, symbol: self.symbol })
    }
}

fn is_amount_within_range(amount: i64) -> bool {
    (-MAX_AMOUNT..=MAX_AMOUNT).contains(&amount)
}

fn check_bounds(amount: i64, op: &'static str) -> Result<(), AssetError> {
    if amount > MAX_AMOUNT {
        return Err(AssetError::Overflow { op });
    }
    if amount < -MAX_AMOUNT {
        return Err(AssetError::Underflow { op });
    }
    Ok(())
}

impl Neg for Asset {
    type Output = Asset;

    // the range is symmetric so negation always stays in range
    fn neg(self) -> Self::Output {
        Asset { amount: -self.amount, symbol: self.symbol }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = self.symbol.precision().min(MAX_PRECISION) as u32;
        let sign = if self.amount < 0 { "-" } else { "" };
        let magnitude = self.amount.unsigned_abs();
        if precision == 0 {
            return write!(f, "{}{} {}", sign, magnitude, self.symbol.code());
        }
        let scale = 10u64.pow(precision);
        write!(
            f,
            "{}{}.{:0width$} {}",
            sign,
            magnitude / scale,
            magnitude % scale,
            self.symbol.code(),
            width = precision as usize
        )
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset({})", self)
    }
}

impl FromStr for Asset {
    type Err = AssetError;

    /// Parses `[-]digits[.digits] CODE`; the number of fractional digits is the precision
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AssetError::Malformed(s.to_string());
        let (number, code) = s.trim().split_once(' ').ok_or_else(malformed)?;
        let code: SymbolCode = code.trim().parse()?;

        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) if !fraction.is_empty() => (whole, fraction),
            Some(_) => return Err(malformed()),
            None => (digits, ""),
        };
        if whole.is_empty() || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if fraction.len() > MAX_PRECISION as usize {
            return Err(AssetError::InvalidSymbol);
        }

        let magnitude = whole.bytes().chain(fraction.bytes()).try_fold(0u128, |acc, b| {
            acc.checked_mul(10)
                .and_then(|acc| acc.checked_add((b - b'0') as u128))
                .filter(|acc| *acc <= MAX_AMOUNT as u128)
                .ok_or(AssetError::AmountOutOfRange)
        })?;
        // bounded by MAX_AMOUNT above
        let amount = magnitude as i64;
        let amount = if negative { -amount } else { amount };

        Asset::new(amount, Symbol::new(code, fraction.len() as u8))
    }
}
