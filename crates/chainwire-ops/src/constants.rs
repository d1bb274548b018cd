//! Protocol numbers fixed by the network.

/// Smallest `max_gas` accepted for a function call.
pub const MIN_GAS_CALL: u64 = 2_100_000;
/// Largest `max_gas` accepted for a function call.
pub const MAX_GAS_CALL: u64 = 4_294_167_295;
/// Largest `max_gas` accepted for bytecode execution.
pub const MAX_GAS_EXECUTE: u64 = 3_980_167_295;
/// Deployments are bytecode executions.
pub const MAX_GAS_DEPLOYMENT: u64 = MAX_GAS_EXECUTE;

/// Periods an operation stays valid when the caller gives no time-to-live.
pub const DEFAULT_PERIOD_TO_LIVE: u64 = 10;

/// Decimals of the native coin; amounts travel as integer base units.
pub const COIN_DECIMALS: u32 = 9;
/// Storage cost of one byte, in base units (0.0001 coin).
pub const STORAGE_BYTE_COST: u64 = 100_000;
/// Ledger footprint charged for creating an account.
pub const ACCOUNT_SIZE_BYTES: u64 = 10;

/// Known chain identifiers, mixed into every signed payload.
pub mod chain_id {
    pub const MAINNET: u64 = 77_658_377;
    pub const BUILDNET: u64 = 77_658_366;
}

/// Event prefix the deployer emits once a contract is created.
pub const DEPLOYED_EVENT_PREFIX: &str = "Contract deployed at address: ";
