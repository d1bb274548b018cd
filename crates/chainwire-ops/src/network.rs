//! The `LedgerNetwork` trait, the seam between the operation pipeline and
//! whatever talks to a node (JSON-RPC client, gRPC client, in-memory mock).

use std::fmt;

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::keys::Address;
use crate::operation::SignedOperation;

/// Execution status of a submitted operation, as reported by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStatus {
    /// The node does not know the operation.
    NotFound,
    /// In the pool, not yet in a block.
    PendingInclusion,
    /// Executed in a candidate block, not yet final.
    SpeculativeSuccess,
    SpeculativeError,
    /// Executed in a final block.
    Success,
    Error,
}

impl OperationStatus {
    pub fn is_final(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    pub fn is_speculative(self) -> bool {
        matches!(self, Self::SpeculativeSuccess | Self::SpeculativeError)
    }

    /// `true` once the operation has executed, speculatively or finally.
    pub fn is_executed(self) -> bool {
        self.is_speculative() || self.is_final()
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::PendingInclusion => write!(f, "pending inclusion"),
            Self::SpeculativeSuccess => write!(f, "speculative success"),
            Self::SpeculativeError => write!(f, "speculative error"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A read-only function call evaluated by the node without submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyCall {
    pub target: Address,
    pub function: String,
    pub parameter: Vec<u8>,
    /// Address the call is evaluated as.
    pub caller: Address,
    pub coins: u64,
    pub fee: u64,
    pub max_gas: u64,
}

/// An event emitted by contract execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractEvent {
    pub data: String,
    pub is_error: bool,
}

impl ContractEvent {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            is_error: false,
        }
    }
}

/// Outcome of a [`ReadOnlyCall`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadOnlyResult {
    /// Bytes returned by the function.
    pub value: Vec<u8>,
    pub gas_cost: u64,
    /// Set when the execution failed; `value` is then meaningless.
    pub error: Option<String>,
    pub events: Vec<ContractEvent>,
}

/// Node operations the pipeline consumes.
///
/// Object-safe; the manager holds it as `Arc<dyn LedgerNetwork>`.
#[async_trait]
pub trait LedgerNetwork: Send + Sync + 'static {
    /// Smallest fee the node accepts, in base units.
    async fn minimal_fee(&self) -> Result<u64, NetworkError>;

    /// Balance of `address`, final or candidate.
    async fn balance(&self, address: &Address, final_balance: bool) -> Result<u64, NetworkError>;

    /// The period the node is currently at.
    async fn current_period(&self) -> Result<u64, NetworkError>;

    async fn chain_id(&self) -> Result<u64, NetworkError>;

    /// Submit a signed operation and return the id the node assigned.
    async fn submit_operation(&self, operation: &SignedOperation) -> Result<String, NetworkError>;

    async fn operation_status(&self, operation_id: &str) -> Result<OperationStatus, NetworkError>;

    /// Read raw datastore values of a contract, one result per key.
    async fn read_storage(
        &self,
        address: &Address,
        keys: &[Vec<u8>],
        final_state: bool,
    ) -> Result<Vec<Vec<u8>>, NetworkError>;

    async fn execute_read_only_call(&self, call: &ReadOnlyCall) -> Result<ReadOnlyResult, NetworkError>;

    /// Events emitted while executing `operation_id`.
    async fn operation_events(&self, operation_id: &str) -> Result<Vec<ContractEvent>, NetworkError>;
}
