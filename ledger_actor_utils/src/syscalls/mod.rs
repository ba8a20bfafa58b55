use crate::name::AccountName;

pub mod fake_syscalls;

/// The Syscalls trait defines the capabilities a ledger contract receives from its host
///
/// Key management and signature checks stay on the host side; the contract only asks whether an
/// authority is present on the action currently executing.
pub trait Syscalls {
    /// Returns the account the contract is deployed to
    fn receiver(&self) -> AccountName;

    /// Returns true if the current action carries the authority of `account`
    fn has_authority(&self, account: AccountName) -> bool;

    /// Returns true if `account` exists on chain
    fn is_account(&self, account: AccountName) -> bool;

    /// Schedules a notification of the current action to `account`
    ///
    /// Notifying the same account more than once per action has no further effect.
    fn require_recipient(&self, account: AccountName);
}
