pub mod asset;
pub mod codec;
pub mod dispatch;
pub mod symbol;
pub mod token;

pub use asset::Asset;
pub use symbol::{Symbol, SymbolCode};
