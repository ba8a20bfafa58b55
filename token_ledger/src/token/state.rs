use std::collections::BTreeMap;

use cid::Cid;
use fvm_ipld_blockstore::Block;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::tuple::*;
use fvm_ipld_encoding::CborStore;
use fvm_ipld_encoding::DAG_CBOR;
use fvm_ipld_hamt::Hamt;
use fvm_ipld_hamt::{BytesKey, Error as HamtError};
use integer_encoding::VarInt;
use ledger_actor_utils::AccountName;
use log::trace;
use multihash_codetable::Code;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::{Asset, AssetError};
use crate::symbol::SymbolCode;

/// This value has been chosen to keep the stat and accounts tables shallow for the handful of
/// symbols and holders a typical token contract serves.
pub const DEFAULT_HAMT_BIT_WIDTH: u32 = 3;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("ipld hamt error: {0}")]
    IpldHamt(#[from] HamtError),
    #[error("missing state at cid: {0}")]
    MissingState(Cid),
    #[error("underlying serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("no balance object found")]
    NoBalanceObject { owner: AccountName, code: SymbolCode },
    #[error("overdrawn balance")]
    OverdrawnBalance { owner: AccountName, balance: Asset, delta: Asset },
    #[error("stats row for {0} already exists")]
    DuplicateStats(SymbolCode),
    #[error("stats row for {0} does not exist")]
    MissingStats(SymbolCode),
}

#[derive(Error, Debug)]
pub enum StateInvariantError {
    #[error("supply {supply} of {code} is negative")]
    SupplyNegative { code: SymbolCode, supply: Asset },
    #[error("supply {supply} of {code} exceeds max supply {max_supply}")]
    SupplyExceedsMax { code: SymbolCode, supply: Asset, max_supply: Asset },
    #[error("max supply {max_supply} of {code} is not positive")]
    MaxSupplyNotPositive { code: SymbolCode, max_supply: Asset },
    #[error("row stored under {code} holds {found}")]
    SymbolKeyMismatch { code: SymbolCode, found: Asset },
    #[error("the account {owner} had a negative balance of {balance}")]
    BalanceNegative { owner: AccountName, balance: Asset },
    #[error("the account {owner} holds {balance} of a symbol with no stats row")]
    OrphanBalance { owner: AccountName, balance: Asset },
    #[error("the supply {supply} does not match the sum of all balances {balance_sum}")]
    BalanceSupplyMismatch { supply: Asset, balance_sum: Asset },
    #[error("stored an empty accounts table for {0}")]
    ExplicitEmptyAccounts(AccountName),
    #[error("invalid serialized key {0:?}")]
    InvalidKey(BytesKey),
    #[error("underlying state error {0}")]
    State(#[from] StateError),
}

type Result<T> = std::result::Result<T, StateError>;

type Map<'bs, BS, K, V> = Hamt<&'bs BS, V, K>;
type StatsMap<'bs, BS> = Map<'bs, BS, BytesKey, Row<CurrencyStats>>;
type AccountsMap<'bs, BS> = Map<'bs, BS, BytesKey, Cid>;
type OwnerAccountsMap<'bs, BS> = Map<'bs, BS, BytesKey, Row<Account>>;

/// Global supply record of a symbol, one per symbol code
#[derive(Serialize_tuple, Deserialize_tuple, PartialEq, Eq, Clone, Debug)]
pub struct CurrencyStats {
    pub supply: Asset,
    pub max_supply: Asset,
    pub issuer: AccountName,
}

/// Balance of one symbol held by one account
#[derive(Serialize_tuple, Deserialize_tuple, PartialEq, Eq, Clone, Copy, Debug)]
pub struct Account {
    pub balance: Asset,
}

/// A table row and the account billed for its storage
///
/// The payer is fixed when the row is created and carried through later modifications.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Row<T> {
    pub payer: AccountName,
    pub data: T,
}

/// Token ledger IPLD structure
#[derive(Serialize_tuple, Deserialize_tuple, PartialEq, Eq, Clone, Debug)]
pub struct TokenState {
    /// Map<SymbolCode, Row<CurrencyStats>> as a Hamt
    pub stats: Cid,
    /// Map<AccountName, Map<SymbolCode, Row<Account>>> as a Hamt. Rows are stored
    /// accounts[owner][code]
    pub accounts: Cid,
    /// Bit-width to use when loading Hamts
    hamt_bit_width: u32,
}

/// An abstraction over the IPLD layer to read and modify the stat and accounts tables.
///
/// Authorization, precision and supply-cap checks belong to the caller. Non-negative balances
/// are enforced here.
impl TokenState {
    /// Create a new ledger state-tree, without committing it (the root cid) to a blockstore
    pub fn new<BS: Blockstore>(store: &BS) -> Result<Self> {
        Self::new_with_bit_width(store, DEFAULT_HAMT_BIT_WIDTH)
    }

    /// Create a new ledger state-tree, without committing it (the root cid) to a blockstore
    ///
    /// Explicitly sets the bit width of underlying Hamt structures. Caller must ensure
    /// 1 <= hamt_bit_width <= 8.
    pub fn new_with_bit_width<BS: Blockstore>(store: &BS, hamt_bit_width: u32) -> Result<Self> {
        // Blockstore is still needed to create valid Cids for the Hamts
        let empty_stats_map = StatsMap::new_with_bit_width(store, hamt_bit_width).flush()?;
        let empty_accounts_map = AccountsMap::new_with_bit_width(store, hamt_bit_width).flush()?;

        Ok(Self { stats: empty_stats_map, accounts: empty_accounts_map, hamt_bit_width })
    }

    /// Loads a fresh copy of the state from a blockstore from a given cid
    pub fn load<BS: Blockstore>(bs: &BS, cid: &Cid) -> Result<Self> {
        match bs.get_cbor::<Self>(cid) {
            Ok(Some(state)) => Ok(state),
            Ok(None) => Err(StateError::MissingState(*cid)),
            Err(err) => Err(StateError::Serialization(err.to_string())),
        }
    }

    /// Saves the current state to the blockstore, returning the cid
    pub fn save<BS: Blockstore>(&self, bs: &BS) -> Result<Cid> {
        let serialized = fvm_ipld_encoding::to_vec(self)
            .map_err(|err| StateError::Serialization(err.to_string()))?;
        let block = Block { codec: DAG_CBOR, data: serialized };
        bs.put(Code::Blake2b256, &block).map_err(|err| StateError::Serialization(err.to_string()))
    }

    pub fn hamt_bit_width(&self) -> u32 {
        self.hamt_bit_width
    }

    /// Get the stats row of a symbol code, if the token was created
    pub fn get_stats<BS: Blockstore>(
        &self,
        bs: &BS,
        code: SymbolCode,
    ) -> Result<Option<Row<CurrencyStats>>> {
        let stats = self.get_stats_map(bs)?;
        Ok(stats.get(&code_key(code))?.cloned())
    }

    /// Insert the stats row of a new symbol, billing `payer`
    pub fn insert_stats<BS: Blockstore>(
        &mut self,
        bs: &BS,
        stats: CurrencyStats,
        payer: AccountName,
    ) -> Result<()> {
        let code = stats.supply.symbol().code();
        let mut stats_map = self.get_stats_map(bs)?;
        let key = code_key(code);
        if stats_map.contains_key(&key)? {
            return Err(StateError::DuplicateStats(code));
        }
        stats_map.set(key, Row { payer, data: stats })?;
        self.stats = stats_map.flush()?;
        trace!("created stats row for {} billed to {}", code, payer);
        Ok(())
    }

    /// Replace the supply of an existing symbol, keeping the original payer
    pub fn set_supply<BS: Blockstore>(&mut self, bs: &BS, supply: Asset) -> Result<()> {
        let code = supply.symbol().code();
        let mut stats_map = self.get_stats_map(bs)?;
        let key = code_key(code);
        let mut row = stats_map.get(&key)?.cloned().ok_or(StateError::MissingStats(code))?;
        row.data.supply = supply;
        stats_map.set(key, row)?;
        self.stats = stats_map.flush()?;
        Ok(())
    }

    /// Get the balance row of `owner` for a symbol code
    ///
    /// A missing row reads as None, which callers may treat as a zero balance.
    pub fn get_account<BS: Blockstore>(
        &self,
        bs: &BS,
        owner: AccountName,
        code: SymbolCode,
    ) -> Result<Option<Row<Account>>> {
        match self.get_owner_accounts_map(bs, owner)? {
            Some(map) => Ok(map.get(&code_key(code))?.cloned()),
            None => Ok(None),
        }
    }

    /// Write a balance row, creating it billed to `payer` if it doesn't exist
    ///
    /// An existing row keeps its original payer. Returns true if the row was created.
    pub fn upsert_account<BS: Blockstore>(
        &mut self,
        bs: &BS,
        owner: AccountName,
        account: Account,
        payer: AccountName,
    ) -> Result<bool> {
        if account.balance.amount() < 0 {
            return Err(StateError::OverdrawnBalance {
                owner,
                balance: account.balance,
                delta: account.balance,
            });
        }

        let mut root_accounts_map = self.get_accounts_map(bs)?;

        // get or create the owner's accounts table
        let owner_key = name_key(owner);
        let mut owner_map = match root_accounts_map.get(&owner_key)? {
            Some(cid) => OwnerAccountsMap::load_with_bit_width(cid, bs, self.hamt_bit_width)?,
            None => OwnerAccountsMap::new_with_bit_width(bs, self.hamt_bit_width),
        };

        let code = account.balance.symbol().code();
        let key = code_key(code);
        let (row, created) = match owner_map.get(&key)? {
            Some(existing) => (Row { payer: existing.payer, data: account }, false),
            None => (Row { payer, data: account }, true),
        };
        owner_map.set(key, row)?;

        root_accounts_map.set(owner_key, owner_map.flush()?)?;
        self.accounts = root_accounts_map.flush()?;

        if created {
            trace!("created {} balance row for {} billed to {}", code, owner, payer);
        }
        Ok(created)
    }

    /// Erase a balance row, returning it if it existed
    ///
    /// If the owner's table becomes empty it is removed from the root map.
    pub fn erase_account<BS: Blockstore>(
        &mut self,
        bs: &BS,
        owner: AccountName,
        code: SymbolCode,
    ) -> Result<Option<Row<Account>>> {
        let mut owner_map = match self.get_owner_accounts_map(bs, owner)? {
            Some(map) => map,
            None => return Ok(None),
        };
        let erased = match owner_map.delete(&code_key(code))? {
            Some((_, row)) => row,
            None => return Ok(None),
        };

        let owner_key = name_key(owner);
        let mut root_accounts_map = self.get_accounts_map(bs)?;
        if owner_map.is_empty() {
            root_accounts_map.delete(&owner_key)?;
        } else {
            root_accounts_map.set(owner_key, owner_map.flush()?)?;
        }
        self.accounts = root_accounts_map.flush()?;

        trace!("erased {} balance row of {}", code, owner);
        Ok(Some(erased))
    }

    /// Credit `value` to `owner`, creating the balance row billed to `payer` if absent
    ///
    /// Returns the new balance.
    pub fn add_balance<BS: Blockstore>(
        &mut self,
        bs: &BS,
        owner: AccountName,
        value: &Asset,
        payer: AccountName,
    ) -> Result<Asset> {
        let code = value.symbol().code();
        let balance = match self.get_account(bs, owner, code)? {
            Some(row) => row.data.balance.checked_add(value)?,
            None => *value,
        };
        self.upsert_account(bs, owner, Account { balance }, payer)?;
        Ok(balance)
    }

    /// Debit `value` from `owner`
    ///
    /// Fails if the row is missing or the balance is short. A balance debited to zero keeps its
    /// row. Returns the new balance.
    pub fn sub_balance<BS: Blockstore>(
        &mut self,
        bs: &BS,
        owner: AccountName,
        value: &Asset,
    ) -> Result<Asset> {
        let code = value.symbol().code();
        let row = self
            .get_account(bs, owner, code)?
            .ok_or(StateError::NoBalanceObject { owner, code })?;
        let balance = row.data.balance;
        if balance.amount() < value.amount() {
            return Err(StateError::OverdrawnBalance { owner, balance, delta: -*value });
        }
        let balance = balance.checked_sub(value)?;
        self.upsert_account(bs, owner, Account { balance }, row.payer)?;
        Ok(balance)
    }

    /// Every stats row, ordered by symbol code
    pub fn list_stats<BS: Blockstore>(&self, bs: &BS) -> Result<Vec<Row<CurrencyStats>>> {
        let mut rows = BTreeMap::new();
        self.get_stats_map(bs)?.for_each(|_, row| {
            rows.insert(row.data.supply.symbol().code(), row.clone());
            Ok(())
        })?;
        Ok(rows.into_values().collect())
    }

    /// Every balance row in `owner`'s table, ordered by symbol code
    pub fn list_accounts<BS: Blockstore>(
        &self,
        bs: &BS,
        owner: AccountName,
    ) -> Result<Vec<Row<Account>>> {
        let mut rows = BTreeMap::new();
        if let Some(map) = self.get_owner_accounts_map(bs, owner)? {
            map.for_each(|_, row| {
                rows.insert(row.data.balance.symbol().code(), row.clone());
                Ok(())
            })?;
        }
        Ok(rows.into_values().collect())
    }

    /// Every account that has a balance table
    pub fn list_owners<BS: Blockstore>(&self, bs: &BS) -> Result<Vec<AccountName>> {
        let mut owners = Vec::new();
        let mut bad_key = None;
        self.get_accounts_map(bs)?.for_each(|key, _| {
            match decode_key(key) {
                Some(value) => owners.push(AccountName::new(value)),
                None => bad_key = Some(key.clone()),
            }
            Ok(())
        })?;
        if let Some(key) = bad_key {
            return Err(StateError::Serialization(format!("invalid owner key {:?}", key)));
        }
        owners.sort();
        Ok(owners)
    }

    /// Retrieve the stat table as a HAMT
    pub fn get_stats_map<'bs, BS: Blockstore>(&self, bs: &'bs BS) -> Result<StatsMap<'bs, BS>> {
        Ok(StatsMap::load_with_bit_width(&self.stats, bs, self.hamt_bit_width)?)
    }

    /// Get the root accounts map
    ///
    /// Gets a HAMT with CIDs linking to per-owner HAMTs
    pub fn get_accounts_map<'bs, BS: Blockstore>(
        &self,
        bs: &'bs BS,
    ) -> Result<AccountsMap<'bs, BS>> {
        Ok(AccountsMap::load_with_bit_width(&self.accounts, bs, self.hamt_bit_width)?)
    }

    /// Get the accounts table of a specific owner, resolving the CID link to a Hamt
    ///
    /// Ok(Some) if the owner holds at least one balance row
    /// Ok(None) if the owner has no rows
    /// Err if operations on the underlying Hamt failed
    pub fn get_owner_accounts_map<'bs, BS: Blockstore>(
        &self,
        bs: &'bs BS,
        owner: AccountName,
    ) -> Result<Option<OwnerAccountsMap<'bs, BS>>> {
        let accounts_map = self.get_accounts_map(bs)?;
        let owner_accounts = match accounts_map.get(&name_key(owner))? {
            Some(cid) => Some(OwnerAccountsMap::load_with_bit_width(cid, bs, self.hamt_bit_width)?),
            None => None,
        };
        Ok(owner_accounts)
    }

    /// Checks that the current state obeys all ledger invariants
    ///
    /// Every supply is non-negative and within a positive max supply, every row's symbol agrees
    /// with its key, every balance is non-negative and belongs to a created symbol, the sum of
    /// balances of each symbol equals its supply and no empty owner tables are stored.
    ///
    /// Returns a summary of the supplies and holders that can be used for application checks.
    pub fn check_invariants<BS: Blockstore>(
        &self,
        bs: &BS,
    ) -> std::result::Result<StateSummary, StateInvariantError> {
        let mut stats_rows = Vec::new();
        self.get_stats_map(bs)?
            .for_each(|key, row| {
                stats_rows.push((key.clone(), row.data.clone()));
                Ok(())
            })
            .map_err(StateError::from)?;

        let mut supplies = BTreeMap::new();
        for (key, stats) in stats_rows {
            let code = decode_key(&key)
                .map(SymbolCode::from_raw)
                .ok_or(StateInvariantError::InvalidKey(key))?;
            for asset in [stats.supply, stats.max_supply] {
                if asset.symbol().code() != code || asset.symbol() != stats.supply.symbol() {
                    return Err(StateInvariantError::SymbolKeyMismatch { code, found: asset });
                }
            }
            if stats.max_supply.amount() <= 0 {
                return Err(StateInvariantError::MaxSupplyNotPositive {
                    code,
                    max_supply: stats.max_supply,
                });
            }
            if stats.supply.amount() < 0 {
                return Err(StateInvariantError::SupplyNegative { code, supply: stats.supply });
            }
            if stats.supply.amount() > stats.max_supply.amount() {
                return Err(StateInvariantError::SupplyExceedsMax {
                    code,
                    supply: stats.supply,
                    max_supply: stats.max_supply,
                });
            }
            supplies.insert(code, stats.supply);
        }

        let mut balance_sums: BTreeMap<SymbolCode, Asset> = BTreeMap::new();
        let mut holders = 0;
        for owner in self.list_owners(bs)? {
            let owner_map = self.get_owner_accounts_map(bs, owner)?;
            if owner_map.as_ref().map_or(true, |map| map.is_empty()) {
                return Err(StateInvariantError::ExplicitEmptyAccounts(owner));
            }
            holders += 1;

            let mut balance_rows = Vec::new();
            if let Some(map) = owner_map {
                map.for_each(|key, row| {
                    balance_rows.push((key.clone(), row.data.balance));
                    Ok(())
                })
                .map_err(StateError::from)?;
            }

            for (key, balance) in balance_rows {
                let code = decode_key(&key)
                    .map(SymbolCode::from_raw)
                    .ok_or(StateInvariantError::InvalidKey(key))?;
                if balance.symbol().code() != code {
                    return Err(StateInvariantError::SymbolKeyMismatch { code, found: balance });
                }
                if balance.amount() < 0 {
                    return Err(StateInvariantError::BalanceNegative { owner, balance });
                }
                let supply = match supplies.get(&code) {
                    Some(supply) if supply.symbol() == balance.symbol() => supply,
                    _ => return Err(StateInvariantError::OrphanBalance { owner, balance }),
                };
                let sum = balance_sums.entry(code).or_insert_with(|| Asset::zero(supply.symbol()));
                *sum = sum.checked_add(&balance).map_err(StateError::from)?;
            }
        }

        for supply in supplies.values() {
            let balance_sum = balance_sums
                .get(&supply.symbol().code())
                .copied()
                .unwrap_or_else(|| Asset::zero(supply.symbol()));
            if balance_sum != *supply {
                return Err(StateInvariantError::BalanceSupplyMismatch {
                    supply: *supply,
                    balance_sum,
                });
            }
        }

        Ok(StateSummary { supplies: supplies.into_values().collect(), holders })
    }
}

pub fn code_key(code: SymbolCode) -> BytesKey {
    code.raw().encode_var_vec().into()
}

pub fn name_key(name: AccountName) -> BytesKey {
    name.value().encode_var_vec().into()
}

pub fn decode_key(key: &BytesKey) -> Option<u64> {
    u64::decode_var(key.0.as_slice()).map(|a| a.0)
}

/// A summary of the current state to allow checking application specific invariants
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateSummary {
    /// Supply of every created symbol, ordered by code
    pub supplies: Vec<Asset>,
    /// Number of accounts holding at least one balance row
    pub holders: usize,
}
