//! In-memory `LedgerNetwork` used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chainwire_ops::{
    Address, ContractEvent, LedgerNetwork, NetworkError, OperationStatus, ReadOnlyCall,
    ReadOnlyResult, SignedOperation,
};

pub struct MockState {
    pub minimal_fee: u64,
    pub balance: u64,
    pub current_period: u64,
    pub chain_id: u64,
    /// Statuses handed out in order; the last one repeats.
    pub statuses: VecDeque<OperationStatus>,
    pub events: Vec<ContractEvent>,
    pub read_only: ReadOnlyResult,
    pub storage: HashMap<Vec<u8>, Vec<u8>>,
    /// Reply to submissions with this id instead of the local one.
    pub id_override: Option<String>,
    /// Reject submissions with this reason.
    pub reject: Option<String>,
    /// Stop answering status polls after this many replies.
    pub stall_status_after: Option<usize>,

    pub submitted: Vec<SignedOperation>,
    pub read_only_calls: Vec<ReadOnlyCall>,
    pub balance_queries: usize,
    /// `final_balance` flag of every balance query.
    pub balance_finality: Vec<bool>,
    pub status_polls: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            minimal_fee: 10_000_000,
            balance: 1_000_000_000_000,
            current_period: 1_000,
            chain_id: 77_658_366,
            statuses: VecDeque::from([OperationStatus::Success]),
            events: Vec::new(),
            read_only: ReadOnlyResult::default(),
            storage: HashMap::new(),
            id_override: None,
            reject: None,
            stall_status_after: None,
            submitted: Vec::new(),
            read_only_calls: Vec::new(),
            balance_queries: 0,
            balance_finality: Vec::new(),
            status_polls: 0,
        }
    }
}

#[derive(Default)]
pub struct MockNetwork {
    state: Mutex<MockState>,
}

impl MockNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl LedgerNetwork for MockNetwork {
    async fn minimal_fee(&self) -> Result<u64, NetworkError> {
        Ok(self.state().minimal_fee)
    }

    async fn balance(&self, _address: &Address, final_balance: bool) -> Result<u64, NetworkError> {
        let mut state = self.state();
        state.balance_queries += 1;
        state.balance_finality.push(final_balance);
        Ok(state.balance)
    }

    async fn current_period(&self) -> Result<u64, NetworkError> {
        Ok(self.state().current_period)
    }

    async fn chain_id(&self) -> Result<u64, NetworkError> {
        Ok(self.state().chain_id)
    }

    async fn submit_operation(&self, operation: &SignedOperation) -> Result<String, NetworkError> {
        let mut state = self.state();
        if let Some(reason) = state.reject.clone() {
            return Err(NetworkError::Rejected { reason });
        }
        state.submitted.push(operation.clone());
        Ok(state
            .id_override
            .clone()
            .unwrap_or_else(|| operation.id().to_string()))
    }

    async fn operation_status(&self, _operation_id: &str) -> Result<OperationStatus, NetworkError> {
        let status = {
            let mut state = self.state();
            if state.stall_status_after.is_some_and(|n| state.status_polls >= n) {
                None
            } else {
                state.status_polls += 1;
                let status = if state.statuses.len() > 1 {
                    state.statuses.pop_front()
                } else {
                    state.statuses.front().copied()
                };
                Some(status.unwrap_or(OperationStatus::NotFound))
            }
        };
        match status {
            Some(status) => Ok(status),
            None => std::future::pending().await,
        }
    }

    async fn read_storage(
        &self,
        _address: &Address,
        keys: &[Vec<u8>],
        _final_state: bool,
    ) -> Result<Vec<Vec<u8>>, NetworkError> {
        let state = self.state();
        Ok(keys
            .iter()
            .map(|k| state.storage.get(k).cloned().unwrap_or_default())
            .collect())
    }

    async fn execute_read_only_call(&self, call: &ReadOnlyCall) -> Result<ReadOnlyResult, NetworkError> {
        let mut state = self.state();
        state.read_only_calls.push(call.clone());
        Ok(state.read_only.clone())
    }

    async fn operation_events(&self, _operation_id: &str) -> Result<Vec<ContractEvent>, NetworkError> {
        Ok(self.state().events.clone())
    }
}
