use std::cell::RefCell;
use std::collections::BTreeSet;

use crate::name::AccountName;

use super::Syscalls;

/// An in-memory host fixture that can be twiddled for testing
#[derive(Clone, Default, Debug)]
pub struct FakeSyscalls {
    /// The account the contract runs as
    pub receiver: AccountName,

    /// Accounts that exist on the fake chain
    pub accounts: RefCell<BTreeSet<AccountName>>,
    /// Authorities attached to the action currently executing
    pub authorities: RefCell<BTreeSet<AccountName>>,
    /// Accounts notified by the action currently executing, in notification order
    pub notified: RefCell<Vec<AccountName>>,
}

impl FakeSyscalls {
    pub fn new(receiver: AccountName) -> Self {
        let syscalls = Self { receiver, ..Default::default() };
        syscalls.create_account(receiver);
        syscalls
    }

    pub fn create_account(&self, account: AccountName) {
        self.accounts.borrow_mut().insert(account);
    }

    /// Replaces the authorities of the next action, clearing recorded notifications
    pub fn set_authorities(&self, authorities: &[AccountName]) {
        let mut current = self.authorities.borrow_mut();
        current.clear();
        current.extend(authorities.iter().copied());
        self.notified.borrow_mut().clear();
    }

    pub fn notified(&self) -> Vec<AccountName> {
        self.notified.borrow().clone()
    }
}

impl Syscalls for FakeSyscalls {
    fn receiver(&self) -> AccountName {
        self.receiver
    }

    fn has_authority(&self, account: AccountName) -> bool {
        self.authorities.borrow().contains(&account)
    }

    fn is_account(&self, account: AccountName) -> bool {
        self.accounts.borrow().contains(&account)
    }

    fn require_recipient(&self, account: AccountName) {
        // the contract always sees its own actions
        if account == self.receiver {
            return;
        }
        let mut notified = self.notified.borrow_mut();
        if !notified.contains(&account) {
            notified.push(account);
        }
    }
}
