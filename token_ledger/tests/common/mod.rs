#![allow(dead_code)]

use cid::Cid;
use ledger_actor_utils::shared_blockstore::SharedMemoryBlockstore;
use ledger_actor_utils::syscalls::fake_syscalls::FakeSyscalls;
use ledger_actor_utils::util::ActorRuntime;
use ledger_actor_utils::AccountName;
use token_ledger::codec::Pack;
use token_ledger::dispatch::dispatch;
use token_ledger::token::state::{Account, CurrencyStats, Row};
use token_ledger::token::types::{
    CloseParams, CreateParams, IssueParams, OpenParams, RetireParams, TransferParams,
};
use token_ledger::token::{Token, TokenError};
use token_ledger::SymbolCode;

pub fn name(s: &str) -> AccountName {
    s.parse().unwrap()
}

/// A minimal chain hosting one token contract
///
/// Each pushed action loads the contract state from the current root, runs through the
/// dispatcher and only moves the root forward on success.
pub struct TestChain {
    pub contract: AccountName,
    syscalls: FakeSyscalls,
    blockstore: SharedMemoryBlockstore,
    root: Cid,
    /// Accounts notified by the last pushed action
    pub notified: Vec<AccountName>,
}

impl TestChain {
    /// Deploys the contract to `contract` and creates the given user accounts
    pub fn new(contract: &str, accounts: &[&str]) -> Self {
        let contract = name(contract);
        let syscalls = FakeSyscalls::new(contract);
        for account in accounts {
            syscalls.create_account(name(account));
        }
        let blockstore = SharedMemoryBlockstore::new();
        let state =
            Token::<FakeSyscalls, SharedMemoryBlockstore>::create_state(&blockstore).unwrap();
        let root = state.save(&blockstore).unwrap();
        Self { contract, syscalls, blockstore, root, notified: Vec::new() }
    }

    pub fn root(&self) -> Cid {
        self.root
    }

    fn runtime(&self, authorities: &[&str]) -> ActorRuntime<FakeSyscalls, SharedMemoryBlockstore> {
        let syscalls = self.syscalls.clone();
        let authorities: Vec<AccountName> = authorities.iter().map(|a| name(a)).collect();
        syscalls.set_authorities(&authorities);
        ActorRuntime::new(syscalls, self.blockstore.clone())
    }

    /// Runs `action` with packed `data` under the given authorities
    pub fn push_action(
        &mut self,
        action: &str,
        data: &[u8],
        authorities: &[&str],
    ) -> Result<(), TokenError> {
        let runtime = self.runtime(authorities);
        let mut state = Token::<FakeSyscalls, SharedMemoryBlockstore>::load_state(
            &self.blockstore,
            &self.root,
        )?;
        let mut token = Token::wrap(runtime, &mut state);

        let res = dispatch(&mut token, name(action), data);
        self.notified = token.runtime().syscalls.notified();
        res?;

        token.assert_invariants()?;
        self.root = token.flush()?;
        Ok(())
    }

    /// Runs `action`, asserting it fails with `message` and leaves the root untouched
    pub fn push_action_require_exception(
        &mut self,
        action: &str,
        data: &[u8],
        authorities: &[&str],
        message: &str,
    ) {
        let root = self.root;
        let err = self.push_action(action, data, authorities).unwrap_err();
        assert_eq!(err.message(), message);
        assert_eq!(self.root, root);
    }

    fn with_token<R>(&self, f: impl FnOnce(&Token<FakeSyscalls, SharedMemoryBlockstore>) -> R) -> R {
        let mut state = Token::<FakeSyscalls, SharedMemoryBlockstore>::load_state(
            &self.blockstore,
            &self.root,
        )
        .unwrap();
        let token = Token::wrap(self.runtime(&[]), &mut state);
        f(&token)
    }

    /// The stat table row of `code`, if created
    pub fn get_stats(&self, code: &str) -> Option<CurrencyStats> {
        let code: SymbolCode = code.parse().unwrap();
        self.with_token(|token| {
            token.stat_rows().unwrap().into_iter().map(|row| row.data).find(|stats| {
                stats.supply.symbol().code() == code
            })
        })
    }

    /// Every row of `owner`'s accounts table
    pub fn get_accounts(&self, owner: &str) -> Vec<Row<Account>> {
        self.with_token(|token| token.account_rows(name(owner)).unwrap())
    }

    /// The balance of `owner` as a display string, if a row exists
    pub fn balance(&self, owner: &str, code: &str) -> Option<String> {
        let code: SymbolCode = code.parse().unwrap();
        self.get_accounts(owner)
            .into_iter()
            .find(|row| row.data.balance.symbol().code() == code)
            .map(|row| row.data.balance.to_string())
    }
}

pub fn create_args(issuer: &str, maximum_supply: &str) -> Vec<u8> {
    CreateParams { issuer: name(issuer), maximum_supply: maximum_supply.parse().unwrap() }.packed()
}

pub fn issue_args(to: &str, quantity: &str, memo: &str) -> Vec<u8> {
    IssueParams { to: name(to), quantity: quantity.parse().unwrap(), memo: memo.into() }.packed()
}

pub fn retire_args(quantity: &str, memo: &str) -> Vec<u8> {
    RetireParams { quantity: quantity.parse().unwrap(), memo: memo.into() }.packed()
}

pub fn transfer_args(from: &str, to: &str, quantity: &str, memo: &str) -> Vec<u8> {
    TransferParams {
        from: name(from),
        to: name(to),
        quantity: quantity.parse().unwrap(),
        memo: memo.into(),
    }
    .packed()
}

pub fn open_args(owner: &str, symbol: &str, ram_payer: &str) -> Vec<u8> {
    OpenParams { owner: name(owner), symbol: symbol.parse().unwrap(), ram_payer: name(ram_payer) }
        .packed()
}

pub fn close_args(owner: &str, symbol: &str) -> Vec<u8> {
    CloseParams { owner: name(owner), symbol: symbol.parse().unwrap() }.packed()
}
