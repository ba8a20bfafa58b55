use fvm_shared::error::ExitCode;
use ledger_actor_utils::util::AuthError;
use ledger_actor_utils::AccountName;
use thiserror::Error;

use crate::asset::AssetError;
use crate::codec::CodecError;
use crate::symbol::SymbolCode;
use crate::token::state::StateError as TokenStateError;
use crate::token::state::StateInvariantError;

/// Every token error displays as the fixed abort message the host reports to the caller
#[derive(Error, Debug)]
pub enum TokenError {
    #[error(transparent)]
    TokenState(#[from] TokenStateError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("error in state invariants {0}")]
    StateInvariant(#[from] StateInvariantError),
    #[error("invalid supply")]
    InvalidSupply,
    #[error("max_supply must be positive")]
    MaxSupplyNotPositive,
    #[error("token with symbol already exists")]
    SymbolExists(SymbolCode),
    #[error("issuer account does not exist")]
    IssuerNotFound(AccountName),
    #[error("memo has more than 256 bytes")]
    MemoTooLong(usize),
    #[error("token with symbol does not exist, create token before issue")]
    IssueBeforeCreate(SymbolCode),
    #[error("token with symbol does not exist")]
    TokenNotFound(SymbolCode),
    #[error("symbol does not exist")]
    SymbolNotFound(SymbolCode),
    #[error("tokens can only be issued to issuer account")]
    IssueToNonIssuer { to: AccountName, issuer: AccountName },
    #[error("invalid quantity")]
    InvalidQuantity,
    #[error("must {action} positive quantity")]
    NonPositiveQuantity { action: &'static str },
    #[error("symbol precision mismatch")]
    PrecisionMismatch { expected: u8, found: u8 },
    #[error("quantity exceeds available supply")]
    ExceedsAvailableSupply,
    #[error("cannot transfer to self")]
    TransferToSelf,
    #[error("to account does not exist")]
    RecipientNotFound(AccountName),
    #[error("owner account does not exist")]
    OwnerNotFound(AccountName),
    #[error("Balance row already deleted or never existed. Action won't have any effect.")]
    BalanceRowNotFound { owner: AccountName, code: SymbolCode },
    #[error("Cannot close because the balance is not zero.")]
    NonZeroBalance { owner: AccountName, code: SymbolCode },
    #[error("unknown action {0}")]
    UnknownAction(AccountName),
}

/// Coarse classification of token errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAsset,
    SymbolMismatch,
    Overflow,
    Authorization,
    NotFound,
    PrecisionMismatch,
    BusinessRule,
    Serialization,
    IllegalState,
}

impl From<&AssetError> for ErrorKind {
    fn from(error: &AssetError) -> Self {
        match error {
            AssetError::AmountOutOfRange | AssetError::InvalidSymbol | AssetError::Malformed(_) => {
                ErrorKind::InvalidAsset
            }
            AssetError::SymbolMismatch { op: _ } => ErrorKind::SymbolMismatch,
            AssetError::Overflow { op: _ } | AssetError::Underflow { op: _ } => ErrorKind::Overflow,
        }
    }
}

impl TokenError {
    /// The abort message reported to the caller
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::TokenState(state_error) => match state_error {
                TokenStateError::IpldHamt(_) | TokenStateError::Serialization(_) => {
                    ErrorKind::Serialization
                }
                TokenStateError::MissingState(_) => ErrorKind::IllegalState,
                TokenStateError::Asset(e) => e.into(),
                TokenStateError::NoBalanceObject { owner: _, code: _ }
                | TokenStateError::MissingStats(_) => ErrorKind::NotFound,
                TokenStateError::OverdrawnBalance { owner: _, balance: _, delta: _ }
                | TokenStateError::DuplicateStats(_) => ErrorKind::BusinessRule,
            },
            TokenError::Asset(e) => e.into(),
            TokenError::Codec(codec_error) => match codec_error {
                CodecError::Asset(e) => e.into(),
                _ => ErrorKind::Serialization,
            },
            TokenError::Auth(_) => ErrorKind::Authorization,
            TokenError::StateInvariant(_) => ErrorKind::IllegalState,
            TokenError::InvalidSupply | TokenError::InvalidQuantity => ErrorKind::InvalidAsset,
            TokenError::PrecisionMismatch { expected: _, found: _ } => ErrorKind::PrecisionMismatch,
            TokenError::IssuerNotFound(_)
            | TokenError::IssueBeforeCreate(_)
            | TokenError::TokenNotFound(_)
            | TokenError::SymbolNotFound(_)
            | TokenError::RecipientNotFound(_)
            | TokenError::OwnerNotFound(_)
            | TokenError::BalanceRowNotFound { owner: _, code: _ }
            | TokenError::UnknownAction(_) => ErrorKind::NotFound,
            TokenError::MaxSupplyNotPositive
            | TokenError::SymbolExists(_)
            | TokenError::MemoTooLong(_)
            | TokenError::IssueToNonIssuer { to: _, issuer: _ }
            | TokenError::NonPositiveQuantity { action: _ }
            | TokenError::ExceedsAvailableSupply
            | TokenError::TransferToSelf
            | TokenError::NonZeroBalance { owner: _, code: _ } => ErrorKind::BusinessRule,
        }
    }
}

impl From<&TokenError> for ExitCode {
    fn from(error: &TokenError) -> Self {
        // running out of funds gets its own code so callers can tell it from other rule failures
        if let TokenError::TokenState(TokenStateError::OverdrawnBalance { .. }) = error {
            return ExitCode::USR_INSUFFICIENT_FUNDS;
        }
        match error.kind() {
            ErrorKind::InvalidAsset
            | ErrorKind::SymbolMismatch
            | ErrorKind::Overflow
            | ErrorKind::PrecisionMismatch => ExitCode::USR_ILLEGAL_ARGUMENT,
            ErrorKind::Authorization => ExitCode::USR_FORBIDDEN,
            ErrorKind::NotFound => ExitCode::USR_NOT_FOUND,
            ErrorKind::BusinessRule => ExitCode::USR_ASSERTION_FAILED,
            ErrorKind::Serialization => ExitCode::USR_SERIALIZATION,
            ErrorKind::IllegalState => ExitCode::USR_ILLEGAL_STATE,
        }
    }
}
