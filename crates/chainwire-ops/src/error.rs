//! Error types for the operation pipeline.

use chainwire_core::CodecError;
use thiserror::Error;

use crate::network::OperationStatus;

/// Errors parsing or building keys, addresses and identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("expected prefix '{expected}' in '{value}'")]
    InvalidPrefix { expected: String, value: String },

    #[error("invalid base58check encoding: {reason}")]
    InvalidEncoding { reason: String },

    #[error("unsupported version {version}")]
    UnsupportedVersion { version: u64 },

    #[error("expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("malformed key material: {reason}")]
    Malformed { reason: String },
}

/// Errors reported by a [`LedgerNetwork`](crate::network::LedgerNetwork)
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Connection refused, timed out, or the node is unreachable.
    #[error("network unavailable: {0}")]
    Unavailable(String),

    /// The node refused the request or payload.
    #[error("rejected by node: {reason}")]
    Rejected { reason: String },

    /// JSON-RPC protocol error returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered with something we could not interpret.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl NetworkError {
    /// Returns `true` if this error is transient and a retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Errors from building, signing, submitting or awaiting an operation.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("max gas must be {} {bound}", gas_direction(.is_higher))]
    MaxGas { bound: u64, is_higher: bool },

    #[error("insufficient balance: have {user_balance}, need {needed_balance}")]
    InsufficientBalance { user_balance: u64, needed_balance: u64 },

    #[error("{field} must be a positive non-zero value")]
    NonPositiveAmount { field: &'static str },

    #[error("datastore key 0x{key} is already present")]
    DuplicateDatastoreKey { key: String },

    #[error("malformed operation bytes: {reason}")]
    MalformedOperation { reason: String },

    #[error("operation rejected: {reason}")]
    Rejected { reason: String },

    #[error("operation {operation_id} still {last_status} after {waited_ms}ms")]
    FinalizationTimeout {
        operation_id: String,
        last_status: OperationStatus,
        waited_ms: u64,
    },

    #[error("execution failed: {reason}")]
    Execution { reason: String },

    #[error("no deployed contract address in the events of {operation_id}")]
    DeployedAddressNotFound { operation_id: String },

    #[error("name '{name}' is not registered")]
    NameNotFound { name: String },

    #[error("connected to chain {actual}, expected {expected}")]
    WrongChain { expected: u64, actual: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

fn gas_direction(is_higher: &bool) -> &'static str {
    if *is_higher {
        "at most"
    } else {
        "at least"
    }
}

impl OperationError {
    /// Returns `true` if retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(err) => err.is_retryable(),
            Self::FinalizationTimeout { .. } => true,
            _ => false,
        }
    }
}
