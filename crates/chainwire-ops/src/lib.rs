//! # chainwire-ops
//!
//! Build, encode, sign and submit ledger operations.
//!
//! The pipeline for every operation is the same:
//!
//! 1. **Draft**: caller fields plus [`OperationOptions`]
//! 2. **Resolved**: fee defaults to the node's minimal fee, expire period is
//!    the current period plus the time to live, call gas is estimated
//! 3. **Encoded**: [`OperationDetails::serialize`]
//! 4. **Signed**: [`SignedOperation`], content-addressed id
//! 5. **Submitted**: an [`OperationHandle`] to poll for execution
//!
//! Node access goes through the [`LedgerNetwork`] trait, so the pipeline runs
//! unchanged against a JSON-RPC client or an in-memory mock.
//!
//! ```rust,no_run
//! # async fn demo(network: std::sync::Arc<dyn chainwire_ops::LedgerNetwork>) -> Result<(), chainwire_ops::OperationError> {
//! use chainwire_ops::{ClientConfig, KeyPair, OperationManager, OperationOptions};
//!
//! let account = KeyPair::from_secret_bytes(&[1; 32]);
//! let manager = OperationManager::new(network, account, ClientConfig::default());
//! let recipient = "AU12...".parse()?;
//! let handle = manager
//!     .transfer(&recipient, 1_000_000_000, OperationOptions::default())
//!     .await?;
//! handle.wait_final_execution().await?;
//! # Ok(())
//! # }
//! ```

pub mod amount;
pub mod config;
pub mod constants;
pub mod datastore;
pub mod error;
pub mod finality;
pub mod keys;
pub mod manager;
pub mod mns;
pub mod network;
pub mod operation;
pub mod token;
pub mod tracing_setup;

pub use config::ClientConfig;
pub use datastore::{args_key, coins_key, populate_datastore, ContractDeployment, Datastore};
pub use error::{KeyError, NetworkError, OperationError};
pub use finality::OperationHandle;
pub use keys::{Address, AddressKind, KeyPair, OperationId, PublicKey, Signature};
pub use manager::{CallParams, DeployParams, ExecuteParams, OperationManager, ReadParams};
pub use mns::Mns;
pub use network::{ContractEvent, LedgerNetwork, OperationStatus, ReadOnlyCall, ReadOnlyResult};
pub use operation::{
    OperationDetails, OperationKind, OperationOptions, OperationType, SignedOperation,
};
pub use token::Mrc20;
pub use tracing_setup::{init_tracing, try_init_tracing, LogConfig};
