//! Typed wrapper around a deployed fungible token contract.
//!
//! Metadata lives in the contract's storage under fixed keys; balances and
//! allowances are computed by read-only calls; state changes are function
//! calls. Amounts are 256-bit.

use alloy_primitives::U256;
use chainwire_core::{Args, CodecError, FixedInt};

use crate::error::{NetworkError, OperationError};
use crate::finality::OperationHandle;
use crate::keys::Address;
use crate::manager::{CallParams, OperationManager, ReadParams};
use crate::operation::OperationOptions;

const NAME_KEY: &[u8] = b"NAME";
const SYMBOL_KEY: &[u8] = b"SYMBOL";
const DECIMALS_KEY: &[u8] = b"DECIMALS";
const TOTAL_SUPPLY_KEY: &[u8] = b"TOTAL_SUPPLY";

/// A deployed token contract, driven through an [`OperationManager`].
///
/// ```rust,no_run
/// # async fn demo(manager: chainwire_ops::OperationManager) -> Result<(), chainwire_ops::OperationError> {
/// use chainwire_ops::{Mrc20, OperationOptions};
///
/// let token = Mrc20::new(manager, "AS12...".parse()?);
/// let holder = "AU12...".parse()?;
/// if token.balance_of(&holder).await? > alloy_primitives::U256::ZERO {
///     token.transfer(&holder, alloy_primitives::U256::from(1u8), OperationOptions::default()).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct Mrc20 {
    manager: OperationManager,
    address: Address,
}

impl Mrc20 {
    /// Wrap the token deployed at `address`. Nothing is queried until a
    /// method is called.
    pub fn new(manager: OperationManager, address: Address) -> Self {
        Self { manager, address }
    }

    /// Contract address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    async fn storage_value(&self, key: &[u8], final_state: bool) -> Result<Vec<u8>, OperationError> {
        let mut values = self
            .manager
            .read_storage(&self.address, &[key.to_vec()], final_state)
            .await?;
        if values.is_empty() {
            return Err(NetworkError::Malformed(format!(
                "no value for key {}",
                String::from_utf8_lossy(key)
            ))
            .into());
        }
        Ok(values.swap_remove(0))
    }

    /// Contract version string, from a read-only call.
    pub async fn version(&self) -> Result<String, OperationError> {
        let value = self.read("version", Args::new()).await?;
        utf8(value)
    }

    /// Token name from final storage.
    pub async fn name(&self) -> Result<String, OperationError> {
        utf8(self.storage_value(NAME_KEY, true).await?)
    }

    /// Ticker symbol from final storage.
    pub async fn symbol(&self) -> Result<String, OperationError> {
        utf8(self.storage_value(SYMBOL_KEY, true).await?)
    }

    /// Number of decimals amounts are scaled by.
    pub async fn decimals(&self) -> Result<u8, OperationError> {
        Ok(<u8 as FixedInt>::from_bytes(&self.storage_value(DECIMALS_KEY, true).await?)?)
    }

    /// Total supply in base units, from final or candidate storage.
    pub async fn total_supply(&self, final_state: bool) -> Result<U256, OperationError> {
        Ok(<U256 as FixedInt>::from_bytes(&self.storage_value(TOTAL_SUPPLY_KEY, final_state).await?)?)
    }

    /// Balance of `owner` in base units.
    pub async fn balance_of(&self, owner: &Address) -> Result<U256, OperationError> {
        let value = self
            .read("balanceOf", Args::new().add_string(&owner.to_string()))
            .await?;
        Ok(<U256 as FixedInt>::from_bytes(&value)?)
    }

    /// Amount `spender` may still move out of `owner`'s balance.
    pub async fn allowance(&self, owner: &Address, spender: &Address) -> Result<U256, OperationError> {
        let args = Args::new()
            .add_string(&owner.to_string())
            .add_string(&spender.to_string());
        Ok(<U256 as FixedInt>::from_bytes(&self.read("allowance", args).await?)?)
    }

    /// Send `amount` from the manager's account to `to`.
    pub async fn transfer(
        &self,
        to: &Address,
        amount: U256,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        let args = Args::new().add_string(&to.to_string()).add_u256(amount);
        self.call("transfer", args, options).await
    }

    /// Raise what `spender` may move on the account's behalf.
    pub async fn increase_allowance(
        &self,
        spender: &Address,
        amount: U256,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        let args = Args::new().add_string(&spender.to_string()).add_u256(amount);
        self.call("increaseAllowance", args, options).await
    }

    /// Lower what `spender` may move on the account's behalf.
    pub async fn decrease_allowance(
        &self,
        spender: &Address,
        amount: U256,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        let args = Args::new().add_string(&spender.to_string()).add_u256(amount);
        self.call("decreaseAllowance", args, options).await
    }

    /// Move `amount` from `owner` to `recipient` against an allowance
    /// granted to the manager's account.
    pub async fn transfer_from(
        &self,
        owner: &Address,
        recipient: &Address,
        amount: U256,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        let args = Args::new()
            .add_string(&owner.to_string())
            .add_string(&recipient.to_string())
            .add_u256(amount);
        self.call("transferFrom", args, options).await
    }

    async fn read(&self, function: &str, args: Args) -> Result<Vec<u8>, OperationError> {
        let params = ReadParams::new(self.address, function).with_args(args);
        Ok(self.manager.read_sc(params).await?.value)
    }

    async fn call(
        &self,
        function: &str,
        args: Args,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        let params = CallParams::new(self.address, function)
            .with_args(args)
            .with_options(options);
        self.manager.call_sc(params).await
    }
}

fn utf8(bytes: Vec<u8>) -> Result<String, OperationError> {
    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 { offset: 0 }.into())
}
