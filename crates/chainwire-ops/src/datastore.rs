//! Key/value datastore carried by a bytecode execution, and the layout the
//! deployer bytecode reads its contracts from.

use chainwire_core::{Args, FixedInt};
use indexmap::IndexMap;

use crate::error::OperationError;

/// Insertion-ordered datastore. Entries are encoded in the order they were
/// added, so two builders fed the same sequence produce identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Datastore {
    entries: IndexMap<Vec<u8>, Vec<u8>>,
}

impl Datastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; a key that is already present is rejected.
    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), OperationError> {
        if self.entries.contains_key(&key) {
            return Err(OperationError::DuplicateDatastoreKey {
                key: hex::encode(&key),
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn with_entry(mut self, key: Vec<u8>, value: Vec<u8>) -> Result<Self, OperationError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

/// One contract handed to the deployer bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDeployment {
    pub bytecode: Vec<u8>,
    /// Serialized constructor arguments.
    pub args: Vec<u8>,
    /// Coins forwarded to the constructor.
    pub coins: u64,
}

impl ContractDeployment {
    pub fn new(bytecode: Vec<u8>) -> Self {
        Self {
            bytecode,
            args: Vec::new(),
            coins: 0,
        }
    }
}

/// Build the datastore the deployer bytecode expects.
///
/// Contracts are numbered from 1; `U64` is 8 little-endian bytes and
/// `Args(..)` an [`Args`] encoding:
///
/// - `[0x00]` -> `U64(contract count)`
/// - `U64(i)` -> bytecode
/// - `Args(u64 i, bytes [0])` -> constructor args
/// - `Args(u64 i, bytes [1])` -> `U64(coins)`, only when coins > 0
pub fn populate_datastore(contracts: &[ContractDeployment]) -> Result<Datastore, OperationError> {
    let mut datastore = Datastore::new();
    datastore.insert(vec![0x00], (contracts.len() as u64).to_bytes())?;

    for (index, contract) in contracts.iter().enumerate() {
        let slot = index as u64 + 1;
        datastore.insert(slot.to_bytes(), contract.bytecode.clone())?;
        datastore.insert(args_key(slot), contract.args.clone())?;
        if contract.coins > 0 {
            datastore.insert(coins_key(slot), contract.coins.to_bytes())?;
        }
    }
    Ok(datastore)
}

/// Datastore key holding the constructor args of contract `slot`.
pub fn args_key(slot: u64) -> Vec<u8> {
    Args::new().add_u64(slot).add_uint8_array(&[0]).into_bytes()
}

/// Datastore key holding the coins sent to contract `slot`.
pub fn coins_key(slot: u64) -> Vec<u8> {
    Args::new().add_u64(slot).add_uint8_array(&[1]).into_bytes()
}
