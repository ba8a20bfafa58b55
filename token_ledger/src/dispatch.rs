//! Routes a named action with packed arguments to its handler
use fvm_ipld_blockstore::Blockstore;
use ledger_actor_utils::syscalls::Syscalls;
use ledger_actor_utils::AccountName;

use crate::codec::Unpack;
use crate::token::types::{
    CloseParams, CreateParams, IssueParams, OpenParams, RetireParams, TransferParams,
};
use crate::token::{Token, TokenError};

/// A decoded action, ready to be applied to a token
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Create(CreateParams),
    Issue(IssueParams),
    Retire(RetireParams),
    Transfer(TransferParams),
    Open(OpenParams),
    Close(CloseParams),
}

impl Action {
    /// Decodes the packed arguments of the action called `name`
    ///
    /// The whole buffer must be consumed. An asset amount of 2^62 or more is rejected here,
    /// before any handler runs.
    pub fn decode(name: AccountName, data: &[u8]) -> Result<Self, TokenError> {
        let action = match name.to_string().as_str() {
            "create" => Action::Create(CreateParams::unpacked(data)?),
            "issue" => Action::Issue(IssueParams::unpacked(data)?),
            "retire" => Action::Retire(RetireParams::unpacked(data)?),
            "transfer" => Action::Transfer(TransferParams::unpacked(data)?),
            "open" => Action::Open(OpenParams::unpacked(data)?),
            "close" => Action::Close(CloseParams::unpacked(data)?),
            _ => return Err(TokenError::UnknownAction(name)),
        };
        Ok(action)
    }

    /// Runs the action against `token`
    pub fn apply<S, BS>(&self, token: &mut Token<S, BS>) -> Result<(), TokenError>
    where
        S: Syscalls,
        BS: Blockstore,
    {
        match self {
            Action::Create(p) => token.create(p.issuer, &p.maximum_supply),
            Action::Issue(p) => token.issue(p.to, &p.quantity, &p.memo).map(|_| ()),
            Action::Retire(p) => token.retire(&p.quantity, &p.memo).map(|_| ()),
            Action::Transfer(p) => token.transfer(p.from, p.to, &p.quantity, &p.memo).map(|_| ()),
            Action::Open(p) => token.open(p.owner, &p.symbol, p.ram_payer),
            Action::Close(p) => token.close(p.owner, &p.symbol),
        }
    }
}

/// Decodes and runs the action called `action` with packed arguments `data`
pub fn dispatch<S, BS>(
    token: &mut Token<S, BS>,
    action: AccountName,
    data: &[u8],
) -> Result<(), TokenError>
where
    S: Syscalls,
    BS: Blockstore,
{
    Action::decode(action, data)?.apply(token)
}
