//! Error types for council operations

use crate::{Address, CouncilId, PoolId, Role, Units};

/// Coarse classification of a [`CouncilError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    NotFound,
    AlreadyExists,
    InvalidAmount,
    LimitExceeded,
    ExceedsBalance,
    LengthMismatch,
    External,
}

/// Failures reported by a distribution sink
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("Cannot create a pool for the zero token address")]
    InvalidToken,

    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),

    #[error("Share update rejected for {account}: {reason}")]
    Rejected { account: Address, reason: String },
}

/// Failures reported by token custody
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("Insufficient balance of {token} held by {holder}: required {required}, available {available}")]
    InsufficientBalance {
        token: Address,
        holder: Address,
        required: Units,
        available: Units,
    },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur in council operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouncilError {
    #[error("Account {account} is missing role {role}")]
    Unauthorized { account: Address, role: Role },

    #[error("Council not found: {0}")]
    CouncilNotFound(CouncilId),

    #[error("Council member not found: {0}")]
    MemberNotFound(Address),

    #[error("Council member already added: {0}")]
    MemberAlreadyExists(Address),

    #[error("Grantee not found: {0}")]
    GranteeNotFound(Address),

    #[error("Grantee already added: {0}")]
    GranteeAlreadyExists(Address),

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Voting power too high: {requested} exceeds {max}")]
    VotingPowerTooHigh { requested: Units, max: Units },

    #[error("Too many allocations: {requested} grantees exceeds {max}")]
    TooManyAllocations { requested: usize, max: u8 },

    #[error("Invalid max allocations per member: {requested} (allowed 1..={max})")]
    InvalidMaxAllocations { requested: u8, max: u8 },

    #[error("Total allocated exceeds balance: required {required}, available {available}")]
    ExceedsBalance { required: Units, available: Units },

    #[error("Arrays length mismatch: {accounts} accounts, {amounts} amounts")]
    LengthMismatch { accounts: usize, amounts: usize },

    #[error("Nothing to withdraw for token {0}")]
    NothingToWithdraw(Address),

    #[error("Distribution sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Token custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CouncilError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CouncilError::Unauthorized { .. } => ErrorKind::Authorization,
            CouncilError::CouncilNotFound(_)
            | CouncilError::MemberNotFound(_)
            | CouncilError::GranteeNotFound(_) => ErrorKind::NotFound,
            CouncilError::MemberAlreadyExists(_) | CouncilError::GranteeAlreadyExists(_) => {
                ErrorKind::AlreadyExists
            }
            CouncilError::InvalidAmount | CouncilError::NothingToWithdraw(_) => {
                ErrorKind::InvalidAmount
            }
            CouncilError::VotingPowerTooHigh { .. }
            | CouncilError::TooManyAllocations { .. }
            | CouncilError::InvalidMaxAllocations { .. } => ErrorKind::LimitExceeded,
            CouncilError::ExceedsBalance { .. } => ErrorKind::ExceedsBalance,
            CouncilError::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            CouncilError::Sink(_) | CouncilError::Custody(_) | CouncilError::Config(_) => {
                ErrorKind::External
            }
        }
    }
}

/// Result type alias for council operations
pub type CouncilResult<T> = Result<T, CouncilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let a = Address::from_low_u64(1);
        assert_eq!(
            CouncilError::Unauthorized {
                account: a,
                role: Role::Admin
            }
            .kind(),
            ErrorKind::Authorization
        );
        assert_eq!(CouncilError::GranteeNotFound(a).kind(), ErrorKind::NotFound);
        assert_eq!(
            CouncilError::TooManyAllocations {
                requested: 3,
                max: 2
            }
            .kind(),
            ErrorKind::LimitExceeded
        );
        assert_eq!(
            CouncilError::from(SinkError::InvalidToken).kind(),
            ErrorKind::External
        );
    }

    #[test]
    fn test_error_messages() {
        let err = CouncilError::ExceedsBalance {
            required: 150,
            available: 100,
        };
        assert_eq!(
            err.to_string(),
            "Total allocated exceeds balance: required 150, available 100"
        );
    }
}
