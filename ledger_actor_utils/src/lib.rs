pub mod name;
pub mod shared_blockstore;
pub mod syscalls;
pub mod util;

pub use name::AccountName;
