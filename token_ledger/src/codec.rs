//! Binary encoding of action arguments
//!
//! Fixed-width fields are little-endian. An asset is its 8-byte signed amount followed by its
//! 8-byte symbol. Strings carry a LEB128 `varuint32` length prefix.
use integer_encoding::VarInt;
use ledger_actor_utils::AccountName;
use thiserror::Error;

use crate::asset::{Asset, AssetError};
use crate::symbol::{Symbol, SymbolCode};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of action data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },
    #[error("{0} unconsumed bytes after action data")]
    TrailingBytes(usize),
    #[error("invalid length prefix")]
    InvalidLength,
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error(transparent)]
    Asset(#[from] AssetError),
}

type Result<T> = std::result::Result<T, CodecError>;

/// Cursor over packed action data
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(CodecError::UnexpectedEnd { needed: len, remaining: self.remaining() });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_varuint32(&mut self) -> Result<u32> {
        let rest = &self.data[self.pos..];
        let (value, read) = u32::decode_var(rest).ok_or(if rest.is_empty() {
            CodecError::UnexpectedEnd { needed: 1, remaining: 0 }
        } else {
            CodecError::InvalidLength
        })?;
        self.pos += read;
        Ok(value)
    }

    /// Fails unless every byte has been consumed
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

pub trait Pack {
    fn pack(&self, buf: &mut Vec<u8>);

    fn packed(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.pack(&mut buf);
        buf
    }
}

pub trait Unpack: Sized {
    fn unpack(reader: &mut Reader) -> Result<Self>;

    /// Decodes a complete buffer, rejecting trailing bytes
    fn unpacked(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let value = Self::unpack(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

impl Pack for u64 {
    fn pack(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl Unpack for u64 {
    fn unpack(reader: &mut Reader) -> Result<Self> {
        Ok(u64::from_le_bytes(reader.read_array()?))
    }
}

impl Pack for i64 {
    fn pack(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl Unpack for i64 {
    fn unpack(reader: &mut Reader) -> Result<Self> {
        Ok(i64::from_le_bytes(reader.read_array()?))
    }
}

impl Pack for AccountName {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.value().pack(buf)
    }
}

impl Unpack for AccountName {
    fn unpack(reader: &mut Reader) -> Result<Self> {
        Ok(AccountName::new(u64::unpack(reader)?))
    }
}

impl Pack for SymbolCode {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.raw().pack(buf)
    }
}

impl Unpack for SymbolCode {
    fn unpack(reader: &mut Reader) -> Result<Self> {
        Ok(SymbolCode::from_raw(u64::unpack(reader)?))
    }
}

impl Pack for Symbol {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.raw().pack(buf)
    }
}

impl Unpack for Symbol {
    fn unpack(reader: &mut Reader) -> Result<Self> {
        Ok(Symbol::from_raw(u64::unpack(reader)?))
    }
}

impl Pack for Asset {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.amount().pack(buf);
        self.symbol().pack(buf);
    }
}

impl Unpack for Asset {
    fn unpack(reader: &mut Reader) -> Result<Self> {
        let amount = i64::unpack(reader)?;
        let symbol = Symbol::unpack(reader)?;
        Ok(Asset::from_parts(amount, symbol)?)
    }
}

impl Pack for String {
    fn pack(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.len() as u32).encode_var_vec());
        buf.extend_from_slice(self.as_bytes());
    }
}

impl Unpack for String {
    fn unpack(reader: &mut Reader) -> Result<Self> {
        let len = reader.read_varuint32()? as usize;
        let bytes = reader.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }
}
