//! Handle to a submitted operation: status polling, bounded waits and
//! deployment resolution.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};

use crate::constants::DEPLOYED_EVENT_PREFIX;
use crate::error::OperationError;
use crate::keys::Address;
use crate::network::{ContractEvent, LedgerNetwork, OperationStatus};

/// A submitted operation, identified by the id the node returned.
///
/// Waiting is a polling loop bounded by the configured timeout. Dropping the
/// future stops polling; the operation itself stays submitted.
#[derive(Clone)]
pub struct OperationHandle {
    network: Arc<dyn LedgerNetwork>,
    id: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl std::fmt::Debug for OperationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationHandle")
            .field("id", &self.id)
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OperationHandle {
    pub fn new(
        network: Arc<dyn LedgerNetwork>,
        id: impl Into<String>,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            network,
            id: id.into(),
            poll_interval,
            timeout,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn status(&self) -> Result<OperationStatus, OperationError> {
        Ok(self.network.operation_status(&self.id).await?)
    }

    /// Wait until the operation has executed in a candidate block (or is
    /// already final).
    pub async fn wait_speculative_execution(&self) -> Result<OperationStatus, OperationError> {
        self.wait_until(OperationStatus::is_executed).await
    }

    /// Wait until the operation has executed in a final block.
    pub async fn wait_final_execution(&self) -> Result<OperationStatus, OperationError> {
        self.wait_until(OperationStatus::is_final).await
    }

    async fn wait_until(
        &self,
        done: fn(OperationStatus) -> bool,
    ) -> Result<OperationStatus, OperationError> {
        let started = Instant::now();
        let mut last_status = OperationStatus::NotFound;
        loop {
            let remaining = self.timeout.saturating_sub(started.elapsed());
            // A status call that never answers counts against the same deadline.
            match timeout(remaining, self.status()).await {
                Ok(status) => last_status = status?,
                Err(_) => return Err(self.timed_out(last_status, started.elapsed())),
            }
            if done(last_status) {
                tracing::debug!(operation_id = %self.id, status = %last_status, "operation reached status");
                return Ok(last_status);
            }
            let waited = started.elapsed();
            if waited >= self.timeout {
                return Err(self.timed_out(last_status, waited));
            }
            sleep(self.poll_interval.min(self.timeout - waited)).await;
        }
    }

    fn timed_out(&self, last_status: OperationStatus, waited: Duration) -> OperationError {
        tracing::warn!(operation_id = %self.id, status = %last_status, "gave up waiting for operation");
        OperationError::FinalizationTimeout {
            operation_id: self.id.clone(),
            last_status,
            waited_ms: waited.as_millis() as u64,
        }
    }

    pub async fn events(&self) -> Result<Vec<ContractEvent>, OperationError> {
        Ok(self.network.operation_events(&self.id).await?)
    }

    /// Wait for execution, then read the created contract's address from the
    /// deployer's events.
    pub async fn deployed_address(&self, wait_final: bool) -> Result<Address, OperationError> {
        let status = if wait_final {
            self.wait_final_execution().await?
        } else {
            self.wait_speculative_execution().await?
        };
        let events = self.events().await?;

        if matches!(status, OperationStatus::Error | OperationStatus::SpeculativeError) {
            let reason = events
                .iter()
                .filter(|e| e.is_error)
                .map(|e| e.data.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(OperationError::Execution {
                reason: if reason.is_empty() {
                    format!("deployment ended with status {status}")
                } else {
                    reason
                },
            });
        }

        let address = deployed_address_from_events(&events).ok_or_else(|| {
            OperationError::DeployedAddressNotFound {
                operation_id: self.id.clone(),
            }
        })?;
        Ok(address.parse()?)
    }
}

/// The address announced by the last deployment event, if any.
pub fn deployed_address_from_events(events: &[ContractEvent]) -> Option<&str> {
    events.iter().rev().find_map(|event| {
        event
            .data
            .find(DEPLOYED_EVENT_PREFIX)
            .map(|at| event.data[at + DEPLOYED_EVENT_PREFIX.len()..].trim())
    })
}
