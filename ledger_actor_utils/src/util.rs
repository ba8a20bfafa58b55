use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_blockstore::MemoryBlockstore;
use thiserror::Error;

use crate::name::AccountName;
use crate::syscalls::fake_syscalls::FakeSyscalls;
use crate::syscalls::Syscalls;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authority of {0}")]
    MissingAuthority(AccountName),
}

/// ActorRuntime bundles the host capabilities with the blockstore holding contract state
#[derive(Clone, Debug)]
pub struct ActorRuntime<S: Syscalls, BS: Blockstore> {
    pub syscalls: S,
    pub blockstore: BS,
}

impl<S: Syscalls, BS: Blockstore> ActorRuntime<S, BS> {
    pub fn new(syscalls: S, blockstore: BS) -> ActorRuntime<S, BS> {
        ActorRuntime { syscalls, blockstore }
    }

    /// Creates a runtime for the contract account `receiver` backed by fake syscalls and an
    /// in-memory blockstore
    pub fn new_test_runtime(receiver: AccountName) -> ActorRuntime<FakeSyscalls, MemoryBlockstore> {
        ActorRuntime { syscalls: FakeSyscalls::new(receiver), blockstore: MemoryBlockstore::default() }
    }

    /// Returns the account the contract runs as
    pub fn receiver(&self) -> AccountName {
        self.syscalls.receiver()
    }

    /// Returns true if the current action carries `account`'s authority
    pub fn has_auth(&self, account: AccountName) -> bool {
        self.syscalls.has_authority(account)
    }

    /// Fails with AuthError::MissingAuthority unless the current action carries `account`'s
    /// authority
    pub fn require_auth(&self, account: AccountName) -> Result<(), AuthError> {
        if self.syscalls.has_authority(account) {
            Ok(())
        } else {
            Err(AuthError::MissingAuthority(account))
        }
    }

    pub fn is_account(&self, account: AccountName) -> bool {
        self.syscalls.is_account(account)
    }

    /// Notifies `account` of the current action
    pub fn notify(&self, account: AccountName) {
        self.syscalls.require_recipient(account)
    }

    pub fn bs(&self) -> &BS {
        &self.blockstore
    }
}

/// Convenience impl encapsulating the blockstore functionality
impl<S: Syscalls, BS: Blockstore> Blockstore for ActorRuntime<S, BS> {
    fn get(&self, k: &Cid) -> anyhow::Result<Option<Vec<u8>>> {
        self.blockstore.get(k)
    }

    fn put_keyed(&self, k: &Cid, block: &[u8]) -> anyhow::Result<()> {
        self.blockstore.put_keyed(k, block)
    }
}

#[cfg(test)]
mod test {
    use fvm_ipld_blockstore::MemoryBlockstore;

    use crate::name::AccountName;
    use crate::syscalls::fake_syscalls::FakeSyscalls;

    use super::{ActorRuntime, AuthError};

    #[test]
    fn it_requires_authority() {
        let contract: AccountName = "hello".parse().unwrap();
        let alice: AccountName = "alice".parse().unwrap();
        let runtime = ActorRuntime::<FakeSyscalls, MemoryBlockstore>::new_test_runtime(contract);

        assert_eq!(runtime.receiver(), contract);
        let err = runtime.require_auth(alice).unwrap_err();
        assert_eq!(err, AuthError::MissingAuthority(alice));
        assert_eq!(err.to_string(), "missing authority of alice");

        runtime.syscalls.set_authorities(&[alice]);
        runtime.require_auth(alice).unwrap();
        assert!(runtime.has_auth(alice));
        assert!(!runtime.has_auth(contract));
    }
}
