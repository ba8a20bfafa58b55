use fvm_ipld_encoding::tuple::{Deserialize_tuple, Serialize_tuple};
use ledger_actor_utils::AccountName;

use crate::asset::Asset;
use crate::codec::{CodecError, Pack, Reader, Unpack};
use crate::symbol::Symbol;

/// Instruction to create a new symbol with a maximum supply
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct CreateParams {
    pub issuer: AccountName,
    pub maximum_supply: Asset,
}

/// Instruction to issue new tokens into the issuer's balance
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct IssueParams {
    pub to: AccountName,
    pub quantity: Asset,
    pub memo: String,
}

#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct IssueReturn {
    /// The new supply of the symbol
    pub supply: Asset,
    /// The new balance of the issuer
    pub balance: Asset,
}

/// Instruction to take tokens out of circulation from the issuer's balance
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct RetireParams {
    pub quantity: Asset,
    pub memo: String,
}

#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct RetireReturn {
    pub supply: Asset,
    pub balance: Asset,
}

/// Instruction to move tokens between two accounts
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct TransferParams {
    pub from: AccountName,
    pub to: AccountName,
    pub quantity: Asset,
    pub memo: String,
}

#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct TransferReturn {
    pub from_balance: Asset,
    pub to_balance: Asset,
}

/// Instruction to create a zero balance row for `owner`, billed to `ram_payer`
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct OpenParams {
    pub owner: AccountName,
    pub symbol: Symbol,
    pub ram_payer: AccountName,
}

/// Instruction to delete `owner`'s zero balance row of a symbol
#[derive(Serialize_tuple, Deserialize_tuple, Clone, Debug, PartialEq, Eq)]
pub struct CloseParams {
    pub owner: AccountName,
    pub symbol: Symbol,
}

impl Pack for CreateParams {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.issuer.pack(buf);
        self.maximum_supply.pack(buf);
    }
}

impl Unpack for CreateParams {
    fn unpack(reader: &mut Reader) -> Result<Self, CodecError> {
        Ok(Self { issuer: Unpack::unpack(reader)?, maximum_supply: Unpack::unpack(reader)? })
    }
}

impl Pack for IssueParams {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.to.pack(buf);
        self.quantity.pack(buf);
        self.memo.pack(buf);
    }
}

impl Unpack for IssueParams {
    fn unpack(reader: &mut Reader) -> Result<Self, CodecError> {
        Ok(Self {
            to: Unpack::unpack(reader)?,
            quantity: Unpack::unpack(reader)?,
            memo: Unpack::unpack(reader)?,
        })
    }
}

impl Pack for RetireParams {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.quantity.pack(buf);
        self.memo.pack(buf);
    }
}

impl Unpack for RetireParams {
    fn unpack(reader: &mut Reader) -> Result<Self, CodecError> {
        Ok(Self { quantity: Unpack::unpack(reader)?, memo: Unpack::unpack(reader)? })
    }
}

impl Pack for TransferParams {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.from.pack(buf);
        self.to.pack(buf);
        self.quantity.pack(buf);
        self.memo.pack(buf);
    }
}

impl Unpack for TransferParams {
    fn unpack(reader: &mut Reader) -> Result<Self, CodecError> {
        Ok(Self {
            from: Unpack::unpack(reader)?,
            to: Unpack::unpack(reader)?,
            quantity: Unpack::unpack(reader)?,
            memo: Unpack::unpack(reader)?,
        })
    }
}

impl Pack for OpenParams {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.owner.pack(buf);
        self.symbol.pack(buf);
        self.ram_payer.pack(buf);
    }
}

impl Unpack for OpenParams {
    fn unpack(reader: &mut Reader) -> Result<Self, CodecError> {
        Ok(Self {
            owner: Unpack::unpack(reader)?,
            symbol: Unpack::unpack(reader)?,
            ram_payer: Unpack::unpack(reader)?,
        })
    }
}

impl Pack for CloseParams {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.owner.pack(buf);
        self.symbol.pack(buf);
    }
}

impl Unpack for CloseParams {
    fn unpack(reader: &mut Reader) -> Result<Self, CodecError> {
        Ok(Self { owner: Unpack::unpack(reader)?, symbol: Unpack::unpack(reader)? })
    }
}
