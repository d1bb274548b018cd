//! `OperationManager`: resolves, checks, encodes, signs and submits
//! operations on behalf of one account.

use std::sync::Arc;

use chainwire_core::Args;

use crate::amount::smart_contract_cost;
use crate::config::ClientConfig;
use crate::constants::{MAX_GAS_CALL, MAX_GAS_DEPLOYMENT, MAX_GAS_EXECUTE, MIN_GAS_CALL};
use crate::datastore::{populate_datastore, ContractDeployment, Datastore};
use crate::error::{NetworkError, OperationError};
use crate::finality::OperationHandle;
use crate::keys::{Address, KeyPair};
use crate::network::{LedgerNetwork, ReadOnlyCall, ReadOnlyResult};
use crate::operation::{OperationDetails, OperationKind, OperationOptions, SignedOperation};

/// Parameters of a smart contract function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallParams {
    pub target: Address,
    pub function: String,
    /// Serialized arguments.
    pub parameter: Vec<u8>,
    pub coins: u64,
    /// Estimated with a read-only call when absent.
    pub max_gas: Option<u64>,
    pub options: OperationOptions,
}

impl CallParams {
    pub fn new(target: Address, function: impl Into<String>) -> Self {
        Self {
            target,
            function: function.into(),
            parameter: Vec::new(),
            coins: 0,
            max_gas: None,
            options: OperationOptions::default(),
        }
    }

    pub fn with_args(mut self, args: Args) -> Self {
        self.parameter = args.into_bytes();
        self
    }

    pub fn with_coins(mut self, coins: u64) -> Self {
        self.coins = coins;
        self
    }

    pub fn with_max_gas(mut self, max_gas: u64) -> Self {
        self.max_gas = Some(max_gas);
        self
    }

    pub fn with_options(mut self, options: OperationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Parameters of a one-off bytecode execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteParams {
    pub bytecode: Vec<u8>,
    pub datastore: Datastore,
    pub max_coins: u64,
    /// Defaults to [`MAX_GAS_EXECUTE`].
    pub max_gas: Option<u64>,
    pub options: OperationOptions,
}

impl ExecuteParams {
    pub fn new(bytecode: Vec<u8>) -> Self {
        Self {
            bytecode,
            datastore: Datastore::new(),
            max_coins: 0,
            max_gas: None,
            options: OperationOptions::default(),
        }
    }
}

/// Parameters of a contract deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployParams {
    pub bytecode: Vec<u8>,
    /// Serialized constructor arguments.
    pub args: Vec<u8>,
    /// Coins forwarded to the constructor.
    pub coins: u64,
    /// Defaults to storage cost plus `coins`.
    pub max_coins: Option<u64>,
    /// Defaults to [`MAX_GAS_DEPLOYMENT`].
    pub max_gas: Option<u64>,
    /// Overrides the configured deployer bytecode.
    pub deployer_bytecode: Option<Vec<u8>>,
    pub options: OperationOptions,
}

impl DeployParams {
    pub fn new(bytecode: Vec<u8>) -> Self {
        Self {
            bytecode,
            args: Vec::new(),
            coins: 0,
            max_coins: None,
            max_gas: None,
            deployer_bytecode: None,
            options: OperationOptions::default(),
        }
    }

    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args.into_bytes();
        self
    }

    pub fn with_coins(mut self, coins: u64) -> Self {
        self.coins = coins;
        self
    }

    /// Storage cost of the contract plus the forwarded coins.
    pub fn total_cost(&self) -> u64 {
        smart_contract_cost(self.bytecode.len() as u64).saturating_add(self.coins)
    }
}

/// Parameters of a read-only function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadParams {
    pub target: Address,
    pub function: String,
    pub parameter: Vec<u8>,
    pub coins: u64,
    pub fee: Option<u64>,
    /// Defaults to [`MAX_GAS_CALL`].
    pub max_gas: Option<u64>,
    /// Defaults to the manager's account.
    pub caller: Option<Address>,
}

impl ReadParams {
    pub fn new(target: Address, function: impl Into<String>) -> Self {
        Self {
            target,
            function: function.into(),
            parameter: Vec::new(),
            coins: 0,
            fee: None,
            max_gas: None,
            caller: None,
        }
    }

    pub fn with_args(mut self, args: Args) -> Self {
        self.parameter = args.into_bytes();
        self
    }
}

/// Builds and sends operations for one account against one network.
///
/// Holds no mutable state: concurrent sends from the same manager are
/// independent, and nothing tracks sequence numbers on the client.
#[derive(Clone)]
pub struct OperationManager {
    network: Arc<dyn LedgerNetwork>,
    account: KeyPair,
    config: ClientConfig,
}

impl OperationManager {
    pub fn new(network: Arc<dyn LedgerNetwork>, account: KeyPair, config: ClientConfig) -> Self {
        Self {
            network,
            account,
            config,
        }
    }

    pub fn account(&self) -> &KeyPair {
        &self.account
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn network(&self) -> &Arc<dyn LedgerNetwork> {
        &self.network
    }

    // ─── Resolution ──────────────────────────────────────────────────────────

    async fn resolve_fee(&self, fee: Option<u64>) -> Result<u64, OperationError> {
        match fee {
            Some(fee) => Ok(fee),
            None => Ok(self.network.minimal_fee().await?),
        }
    }

    /// Absolute expire period: the node's current period plus the time to live.
    pub async fn expire_period(&self, period_to_live: Option<u64>) -> Result<u64, OperationError> {
        let current = self.network.current_period().await?;
        Ok(current.saturating_add(period_to_live.unwrap_or(self.config.period_to_live)))
    }

    /// Chain id mixed into signatures: the configured one, else the node's.
    pub async fn chain_id(&self) -> Result<u64, OperationError> {
        match self.config.chain_id {
            Some(id) => Ok(id),
            None => Ok(self.network.chain_id().await?),
        }
    }

    /// Fill in fee and expire period.
    pub async fn resolve(
        &self,
        kind: OperationKind,
        options: OperationOptions,
    ) -> Result<OperationDetails, OperationError> {
        let fee = self.resolve_fee(options.fee).await?;
        let expire_period = self.expire_period(options.period_to_live).await?;
        tracing::debug!(
            fee,
            expire_period,
            operation_type = ?kind.operation_type(),
            "resolved operation"
        );
        Ok(OperationDetails {
            fee,
            expire_period,
            kind,
        })
    }

    /// Fail before encoding if the account cannot cover `needed`. Skipped for 0.
    ///
    /// Compares against the final balance; coins that only exist in candidate
    /// blocks are not counted.
    pub async fn check_balance(&self, needed: u64) -> Result<(), OperationError> {
        if needed == 0 {
            return Ok(());
        }
        let balance = self.network.balance(self.account.address(), true).await?;
        if balance < needed {
            tracing::debug!(balance, needed, "insufficient balance");
            return Err(OperationError::InsufficientBalance {
                user_balance: balance,
                needed_balance: needed,
            });
        }
        Ok(())
    }

    // ─── Sign & send ─────────────────────────────────────────────────────────

    pub async fn sign(&self, details: OperationDetails) -> Result<SignedOperation, OperationError> {
        let chain_id = self.chain_id().await?;
        Ok(SignedOperation::sign(details, &self.account, chain_id))
    }

    /// Sign and submit. The returned handle carries the node's id; a local id
    /// that disagrees with it is logged.
    pub async fn send(&self, details: OperationDetails) -> Result<OperationHandle, OperationError> {
        let signed = self.sign(details).await?;
        let local_id = signed.id().to_string();

        let network_id = self
            .network
            .submit_operation(&signed)
            .await
            .map_err(|e| match e {
                NetworkError::Rejected { reason } => OperationError::Rejected { reason },
                other => OperationError::Network(other),
            })?;

        if network_id != local_id {
            tracing::warn!(
                local_id = %local_id,
                network_id = %network_id,
                "node returned a different operation id"
            );
        }
        tracing::info!(operation_id = %network_id, "operation submitted");
        Ok(self.handle(network_id))
    }

    /// Handle for an already-submitted operation id.
    pub fn handle(&self, operation_id: impl Into<String>) -> OperationHandle {
        OperationHandle::new(
            Arc::clone(&self.network),
            operation_id,
            self.config.poll_interval(),
            self.config.finalization_timeout(),
        )
    }

    // ─── Operations ──────────────────────────────────────────────────────────

    pub async fn transfer(
        &self,
        recipient: &Address,
        amount: u64,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        if amount == 0 {
            return Err(OperationError::NonPositiveAmount { field: "amount" });
        }
        self.check_balance(amount).await?;
        let details = self
            .resolve(
                OperationKind::Transaction {
                    recipient: *recipient,
                    amount,
                },
                options,
            )
            .await?;
        self.send(details).await
    }

    pub async fn buy_rolls(
        &self,
        count: u64,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        if count == 0 {
            return Err(OperationError::NonPositiveAmount { field: "roll count" });
        }
        let details = self.resolve(OperationKind::RollBuy { count }, options).await?;
        self.send(details).await
    }

    pub async fn sell_rolls(
        &self,
        count: u64,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        if count == 0 {
            return Err(OperationError::NonPositiveAmount { field: "roll count" });
        }
        let details = self.resolve(OperationKind::RollSell { count }, options).await?;
        self.send(details).await
    }

    pub async fn call_sc(&self, params: CallParams) -> Result<OperationHandle, OperationError> {
        if let Some(max_gas) = params.max_gas {
            check_call_gas(max_gas)?;
        }
        self.check_balance(params.coins).await?;

        let fee = self.resolve_fee(params.options.fee).await?;
        let max_gas = match params.max_gas {
            Some(max_gas) => max_gas,
            None => self.estimate_gas(&params, fee).await?,
        };
        let options = OperationOptions {
            fee: Some(fee),
            ..params.options
        };

        let details = self
            .resolve(
                OperationKind::CallSmartContractFunction {
                    max_gas,
                    coins: params.coins,
                    target: params.target,
                    function: params.function,
                    parameter: params.parameter,
                },
                options,
            )
            .await?;
        self.send(details).await
    }

    pub async fn execute_sc(&self, params: ExecuteParams) -> Result<OperationHandle, OperationError> {
        self.check_balance(params.max_coins).await?;
        let details = self
            .resolve(
                OperationKind::ExecuteSmartContractBytecode {
                    max_gas: params.max_gas.unwrap_or(MAX_GAS_EXECUTE),
                    max_coins: params.max_coins,
                    bytecode: params.bytecode,
                    datastore: params.datastore,
                },
                params.options,
            )
            .await?;
        self.send(details).await
    }

    /// Submit a deployment: the deployer bytecode runs with the contract,
    /// its constructor args and coins packed into the datastore. Resolve the
    /// created address with [`OperationHandle::deployed_address`].
    pub async fn deploy_sc(&self, params: DeployParams) -> Result<OperationHandle, OperationError> {
        let total_cost = params.total_cost();
        let deployer = match params.deployer_bytecode {
            Some(bytecode) => bytecode,
            None => self.config.deployer_bytecode()?.ok_or_else(|| {
                OperationError::Config("no deployer bytecode configured".into())
            })?,
        };

        self.check_balance(total_cost).await?;

        let datastore = populate_datastore(&[ContractDeployment {
            bytecode: params.bytecode,
            args: params.args,
            coins: params.coins,
        }])?;
        tracing::debug!(total_cost, entries = datastore.len(), "deploying contract");

        let details = self
            .resolve(
                OperationKind::ExecuteSmartContractBytecode {
                    max_gas: params.max_gas.unwrap_or(MAX_GAS_DEPLOYMENT),
                    max_coins: params.max_coins.unwrap_or(total_cost),
                    bytecode: deployer,
                    datastore,
                },
                params.options,
            )
            .await?;
        self.send(details).await
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    /// Evaluate a function without submitting. A failed execution is an
    /// [`OperationError::Execution`].
    pub async fn read_sc(&self, params: ReadParams) -> Result<ReadOnlyResult, OperationError> {
        let fee = self.resolve_fee(params.fee).await?;
        let call = ReadOnlyCall {
            target: params.target,
            function: params.function,
            parameter: params.parameter,
            caller: params.caller.unwrap_or(*self.account.address()),
            coins: params.coins,
            fee,
            max_gas: params.max_gas.unwrap_or(MAX_GAS_CALL),
        };
        let result = self.network.execute_read_only_call(&call).await?;
        match result.error {
            Some(reason) => Err(OperationError::Execution { reason }),
            None => Ok(result),
        }
    }

    pub async fn read_storage(
        &self,
        address: &Address,
        keys: &[Vec<u8>],
        final_state: bool,
    ) -> Result<Vec<Vec<u8>>, OperationError> {
        Ok(self.network.read_storage(address, keys, final_state).await?)
    }

    /// Gas for `params`: the read-only cost plus the configured margin,
    /// clamped to the call bounds.
    pub async fn estimate_gas(&self, params: &CallParams, fee: u64) -> Result<u64, OperationError> {
        let read = ReadParams {
            target: params.target,
            function: params.function.clone(),
            parameter: params.parameter.clone(),
            coins: params.coins,
            fee: Some(fee),
            max_gas: Some(MAX_GAS_CALL),
            caller: None,
        };
        let result = self.read_sc(read).await?;
        let margin = result.gas_cost.saturating_mul(self.config.gas_margin_percent) / 100;
        let estimate = result
            .gas_cost
            .saturating_add(margin)
            .clamp(MIN_GAS_CALL, MAX_GAS_CALL);
        tracing::debug!(gas_cost = result.gas_cost, estimate, "estimated gas");
        Ok(estimate)
    }
}

/// `MIN_GAS_CALL <= max_gas <= MAX_GAS_CALL`.
pub fn check_call_gas(max_gas: u64) -> Result<(), OperationError> {
    if max_gas > MAX_GAS_CALL {
        return Err(OperationError::MaxGas {
            bound: MAX_GAS_CALL,
            is_higher: true,
        });
    }
    if max_gas < MIN_GAS_CALL {
        return Err(OperationError::MaxGas {
            bound: MIN_GAS_CALL,
            is_higher: false,
        });
    }
    Ok(())
}
