use cid::Cid;
pub use error::{ErrorKind, TokenError};
use fvm_ipld_blockstore::Blockstore;
use ledger_actor_utils::syscalls::Syscalls;
use ledger_actor_utils::util::ActorRuntime;
use ledger_actor_utils::AccountName;
use log::debug;

use self::state::{
    Account, CurrencyStats, Row, StateError as TokenStateError, StateInvariantError, StateSummary,
    TokenState,
};
use self::types::{IssueReturn, RetireReturn, TransferReturn};
use crate::asset::{Asset, AssetError};
use crate::symbol::{Symbol, SymbolCode};

mod error;
pub mod state;
pub mod types;

/// Longest memo, in bytes, accepted by issue, retire and transfer
pub const MAX_MEMO_BYTES: usize = 256;

type Result<T> = std::result::Result<T, TokenError>;

/// Library functions that implement the token ledger actions
///
/// Holds injectable services to access/interface with the host and the IPLD layer.
pub struct Token<'st, S, BS>
where
    S: Syscalls,
    BS: Blockstore,
{
    /// Runtime services to interact with the execution environment
    runtime: ActorRuntime<S, BS>,
    /// Reference to token state that will be inspected/mutated
    state: &'st mut TokenState,
}

impl<'st, S, BS> Token<'st, S, BS>
where
    S: Syscalls,
    BS: Blockstore,
{
    /// Creates a new clean token state instance
    ///
    /// This should be wrapped in a Token handle for convenience. Must be flushed to the blockstore
    /// explicitly to persist changes
    pub fn create_state(bs: &BS) -> Result<TokenState> {
        Ok(TokenState::new(bs)?)
    }

    /// Creates a new clean token state instance, specifying the underlying Hamt bit widths
    pub fn create_state_with_bit_width(bs: &BS, hamt_bit_width: u32) -> Result<TokenState> {
        Ok(TokenState::new_with_bit_width(bs, hamt_bit_width)?)
    }

    /// Wrap an existing token state
    pub fn wrap(runtime: ActorRuntime<S, BS>, state: &'st mut TokenState) -> Self {
        Self { runtime, state }
    }

    /// Replace the current state with another
    /// The previous state is returned and can be safely dropped
    pub fn replace(&mut self, state: TokenState) -> TokenState {
        std::mem::replace(self.state, state)
    }

    /// For an already initialised state tree, loads the state tree from the blockstore at a Cid
    pub fn load_state(bs: &BS, state_cid: &Cid) -> Result<TokenState> {
        Ok(TokenState::load(bs, state_cid)?)
    }

    /// Flush state and return Cid for root
    pub fn flush(&mut self) -> Result<Cid> {
        Ok(self.state.save(&self.runtime)?)
    }

    /// Get a reference to the wrapped state tree
    pub fn state(&self) -> &TokenState {
        self.state
    }

    /// Get a reference to the underlying runtime
    pub fn runtime(&self) -> &ActorRuntime<S, BS> {
        &self.runtime
    }

    /// Opens an atomic transaction on TokenState which allows a closure to make multiple
    /// modifications to the state tree.
    ///
    /// If the closure returns an error, the transaction is dropped atomically and no change is
    /// observed on token state.
    fn transaction<F, Res>(&mut self, f: F) -> Result<Res>
    where
        F: FnOnce(&mut TokenState, &ActorRuntime<S, BS>) -> Result<Res>,
    {
        let mut mutable_state = self.state.clone();
        let res = f(&mut mutable_state, &self.runtime)?;
        // if closure didn't error, save state
        *self.state = mutable_state;
        Ok(res)
    }
}

impl<'st, S, BS> Token<'st, S, BS>
where
    S: Syscalls,
    BS: Blockstore,
{
    /// Creates a new symbol with the given maximum supply and issuer
    ///
    /// Only the contract account itself may create tokens, and it pays for the stats row. The
    /// supply starts at zero in the symbol and precision of `maximum_supply`.
    pub fn create(&mut self, issuer: AccountName, maximum_supply: &Asset) -> Result<()> {
        let receiver = self.runtime.receiver();
        self.runtime.require_auth(receiver)?;

        let symbol = maximum_supply.symbol();
        if !symbol.is_valid() {
            return Err(AssetError::InvalidSymbol.into());
        }
        if !maximum_supply.is_valid() {
            return Err(TokenError::InvalidSupply);
        }
        if !maximum_supply.is_positive() {
            return Err(TokenError::MaxSupplyNotPositive);
        }
        if self.state.get_stats(&self.runtime, symbol.code())?.is_some() {
            return Err(TokenError::SymbolExists(symbol.code()));
        }
        if !self.runtime.is_account(issuer) {
            return Err(TokenError::IssuerNotFound(issuer));
        }

        self.transaction(|state, rt| {
            let stats = CurrencyStats {
                supply: Asset::zero(symbol),
                max_supply: *maximum_supply,
                issuer,
            };
            state.insert_stats(rt, stats, receiver)?;
            Ok(())
        })?;

        debug!("created {} with max supply {} issued by {}", symbol, maximum_supply, issuer);
        Ok(())
    }

    /// Issues new tokens into the issuer's own balance
    ///
    /// Tokens can only be issued to the issuer, under the issuer's authority, and never past the
    /// maximum supply. The issuer pays for its balance row if one has to be created.
    pub fn issue(&mut self, to: AccountName, quantity: &Asset, memo: &str) -> Result<IssueReturn> {
        let symbol = quantity.symbol();
        if !symbol.is_valid() {
            return Err(AssetError::InvalidSymbol.into());
        }
        validate_memo(memo)?;

        let stats = self
            .state
            .get_stats(&self.runtime, symbol.code())?
            .ok_or(TokenError::IssueBeforeCreate(symbol.code()))?
            .data;
        if to != stats.issuer {
            return Err(TokenError::IssueToNonIssuer { to, issuer: stats.issuer });
        }
        self.runtime.require_auth(stats.issuer)?;
        validate_quantity(quantity, "issue", &stats)?;

        let available = stats.max_supply.checked_sub(&stats.supply)?;
        if quantity.amount() > available.amount() {
            return Err(TokenError::ExceedsAvailableSupply);
        }

        let res = self.transaction(|state, rt| {
            let supply = stats.supply.checked_add(quantity)?;
            state.set_supply(rt, supply)?;
            let balance = state.add_balance(rt, stats.issuer, quantity, stats.issuer)?;
            Ok(IssueReturn { supply, balance })
        })?;

        debug!("issued {} to {}, supply now {}", quantity, to, res.supply);
        Ok(res)
    }

    /// Takes tokens out of circulation from the issuer's balance
    ///
    /// The issuer's balance is debited first, so retiring more than the issuer holds fails as an
    /// overdrawn balance.
    pub fn retire(&mut self, quantity: &Asset, memo: &str) -> Result<RetireReturn> {
        let symbol = quantity.symbol();
        if !symbol.is_valid() {
            return Err(AssetError::InvalidSymbol.into());
        }
        validate_memo(memo)?;

        let stats = self
            .state
            .get_stats(&self.runtime, symbol.code())?
            .ok_or(TokenError::TokenNotFound(symbol.code()))?
            .data;
        self.runtime.require_auth(stats.issuer)?;
        validate_quantity(quantity, "retire", &stats)?;

        let res = self.transaction(|state, rt| {
            let balance = state.sub_balance(rt, stats.issuer, quantity)?;
            let supply = stats.supply.checked_sub(quantity)?;
            state.set_supply(rt, supply)?;
            Ok(RetireReturn { supply, balance })
        })?;

        debug!("retired {} from {}, supply now {}", quantity, stats.issuer, res.supply);
        Ok(res)
    }

    /// Moves tokens from one account to another
    ///
    /// Both parties are notified. A balance row created for `to` is billed to `from`.
    pub fn transfer(
        &mut self,
        from: AccountName,
        to: AccountName,
        quantity: &Asset,
        memo: &str,
    ) -> Result<TransferReturn> {
        if from == to {
            return Err(TokenError::TransferToSelf);
        }
        self.runtime.require_auth(from)?;
        if !self.runtime.is_account(to) {
            return Err(TokenError::RecipientNotFound(to));
        }

        let code = quantity.symbol().code();
        let stats =
            self.state.get_stats(&self.runtime, code)?.ok_or(TokenError::TokenNotFound(code))?.data;

        self.runtime.notify(from);
        self.runtime.notify(to);

        validate_quantity(quantity, "transfer", &stats)?;
        validate_memo(memo)?;

        let res = self.transaction(|state, rt| {
            let from_balance = state.sub_balance(rt, from, quantity)?;
            let to_balance = state.add_balance(rt, to, quantity, from)?;
            Ok(TransferReturn { from_balance, to_balance })
        })?;

        debug!("transferred {} from {} to {}", quantity, from, to);
        Ok(res)
    }

    /// Creates a zero balance row for `owner`, billed to `ram_payer`
    ///
    /// Does nothing if the row already exists.
    pub fn open(
        &mut self,
        owner: AccountName,
        symbol: &Symbol,
        ram_payer: AccountName,
    ) -> Result<()> {
        self.runtime.require_auth(ram_payer)?;
        if !self.runtime.is_account(owner) {
            return Err(TokenError::OwnerNotFound(owner));
        }

        let code = symbol.code();
        let stats =
            self.state.get_stats(&self.runtime, code)?.ok_or(TokenError::SymbolNotFound(code))?.data;
        check_precision(symbol, &stats)?;

        if self.state.get_account(&self.runtime, owner, code)?.is_some() {
            return Ok(());
        }
        self.transaction(|state, rt| {
            state.upsert_account(rt, owner, Account { balance: Asset::zero(*symbol) }, ram_payer)?;
            Ok(())
        })?;

        debug!("opened {} balance of {} billed to {}", code, owner, ram_payer);
        Ok(())
    }

    /// Deletes `owner`'s balance row of a symbol
    ///
    /// The row must exist and hold a zero balance.
    pub fn close(&mut self, owner: AccountName, symbol: &Symbol) -> Result<()> {
        self.runtime.require_auth(owner)?;

        let code = symbol.code();
        let row = self
            .state
            .get_account(&self.runtime, owner, code)?
            .ok_or(TokenError::BalanceRowNotFound { owner, code })?;
        if !row.data.balance.is_zero() {
            return Err(TokenError::NonZeroBalance { owner, code });
        }

        self.transaction(|state, rt| {
            state.erase_account(rt, owner, code)?;
            Ok(())
        })?;

        debug!("closed {} balance of {}", code, owner);
        Ok(())
    }
}

impl<'st, S, BS> Token<'st, S, BS>
where
    S: Syscalls,
    BS: Blockstore,
{
    /// Returns the stats of a created symbol
    pub fn get_stats(&self, code: SymbolCode) -> Result<CurrencyStats> {
        let row = self.state.get_stats(&self.runtime, code)?;
        Ok(row.ok_or(TokenError::TokenNotFound(code))?.data)
    }

    pub fn get_supply(&self, code: SymbolCode) -> Result<Asset> {
        Ok(self.get_stats(code)?.supply)
    }

    /// Returns the balance of `owner`
    ///
    /// Fails if `owner` has no row for the symbol, even though the balance would read as zero.
    pub fn get_balance(&self, owner: AccountName, code: SymbolCode) -> Result<Asset> {
        let row = self.state.get_account(&self.runtime, owner, code)?;
        Ok(row.ok_or(TokenStateError::NoBalanceObject { owner, code })?.data.balance)
    }

    /// Every stats row, ordered by symbol code
    pub fn stat_rows(&self) -> Result<Vec<Row<CurrencyStats>>> {
        Ok(self.state.list_stats(&self.runtime)?)
    }

    /// Every balance row of `owner`, ordered by symbol code
    pub fn account_rows(&self, owner: AccountName) -> Result<Vec<Row<Account>>> {
        Ok(self.state.list_accounts(&self.runtime, owner)?)
    }

    /// Checks the state invariants, throwing an error if they are not met
    pub fn assert_invariants(&self) -> Result<StateSummary> {
        Ok(self.check_invariants()?)
    }

    /// Checks the state invariants, returning a state summary
    pub fn check_invariants(&self) -> std::result::Result<StateSummary, StateInvariantError> {
        self.state.check_invariants(&self.runtime)
    }
}

/// Validates that a memo fits in MAX_MEMO_BYTES
pub fn validate_memo(memo: &str) -> Result<()> {
    if memo.len() > MAX_MEMO_BYTES {
        return Err(TokenError::MemoTooLong(memo.len()));
    }
    Ok(())
}

/// Validates that a quantity is in range, positive, and in the precision of the symbol's stats
///
/// `action` names the operation in the error message.
pub fn validate_quantity(
    quantity: &Asset,
    action: &'static str,
    stats: &CurrencyStats,
) -> Result<()> {
    if !quantity.is_valid() {
        return Err(TokenError::InvalidQuantity);
    }
    if !quantity.is_positive() {
        return Err(TokenError::NonPositiveQuantity { action });
    }
    check_precision(&quantity.symbol(), stats)
}

fn check_precision(symbol: &Symbol, stats: &CurrencyStats) -> Result<()> {
    let expected = stats.supply.symbol();
    if *symbol != expected {
        return Err(TokenError::PrecisionMismatch {
            expected: expected.precision(),
            found: symbol.precision(),
        });
    }
    Ok(())
}
