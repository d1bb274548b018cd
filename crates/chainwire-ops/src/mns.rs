//! Name service wrapper: resolve names to addresses and manage registrations.
//!
//! Names are given without their `.massa` suffix. Ownership is an NFT; the
//! token id of a name is read from the contract's storage when freeing it.

use alloy_primitives::U256;
use chainwire_core::{Args, CodecError, FixedInt};

use crate::constants::chain_id;
use crate::error::OperationError;
use crate::finality::OperationHandle;
use crate::keys::Address;
use crate::manager::{CallParams, OperationManager, ReadParams};
use crate::operation::OperationOptions;

/// Name service contract on mainnet.
pub const MAINNET_ADDRESS: &str = "AS1q5hUfxLXNXLKsYQVXZLK7MPUZcWaNZZsK7e9QzqhGdAgLpUGT";
/// Name service contract on buildnet.
pub const BUILDNET_ADDRESS: &str = "AS12qKAVjU1nr66JSkQ6N4Lqu4iwuVc6rAbRTrxFoynPrPdP1sj3G";

const DOMAIN_SEPARATOR_KEY: u8 = 0x42;
const TOKEN_ID_KEY_PREFIX: u8 = 0x01;

/// Storage key of the token id owning `name`.
pub fn token_id_key(name: &str) -> Vec<u8> {
    let mut key = vec![DOMAIN_SEPARATOR_KEY, TOKEN_ID_KEY_PREFIX];
    key.extend_from_slice(name.as_bytes());
    key
}

/// The name service contract, driven through an [`OperationManager`].
pub struct Mns {
    manager: OperationManager,
    address: Address,
}

impl std::fmt::Debug for Mns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mns")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Mns {
    /// Wrap a name service deployed at `address`.
    pub fn new(manager: OperationManager, address: Address) -> Self {
        Self { manager, address }
    }

    /// The mainnet contract. Fails with [`OperationError::WrongChain`] when
    /// the manager signs for another chain.
    pub async fn mainnet(manager: OperationManager) -> Result<Self, OperationError> {
        Self::published(manager, chain_id::MAINNET, MAINNET_ADDRESS).await
    }

    /// The buildnet contract, checked like [`Mns::mainnet`].
    pub async fn buildnet(manager: OperationManager) -> Result<Self, OperationError> {
        Self::published(manager, chain_id::BUILDNET, BUILDNET_ADDRESS).await
    }

    async fn published(
        manager: OperationManager,
        expected: u64,
        address: &str,
    ) -> Result<Self, OperationError> {
        let actual = manager.chain_id().await?;
        if actual != expected {
            return Err(OperationError::WrongChain { expected, actual });
        }
        Ok(Self::new(manager, address.parse()?))
    }

    /// Contract address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Target address of `name`, as stored by the contract. Empty when the
    /// name has no target.
    pub async fn resolve(&self, name: &str) -> Result<String, OperationError> {
        let value = self.read("dnsResolve", Args::new().add_string(name)).await?;
        String::from_utf8(value).map_err(|e| {
            CodecError::InvalidUtf8 {
                offset: e.utf8_error().valid_up_to(),
            }
            .into()
        })
    }

    /// Every name pointing at `target`.
    pub async fn from_address(&self, target: &Address) -> Result<Vec<String>, OperationError> {
        let value = self
            .read("dnsReverseResolve", Args::new().add_string(&target.to_string()))
            .await?;
        let joined = String::from_utf8_lossy(&value);
        if joined.is_empty() {
            return Ok(Vec::new());
        }
        Ok(joined.split(',').map(str::to_string).collect())
    }

    /// Register `name` for `owner`. `coins` pays for the registration and its
    /// storage.
    pub async fn alloc(
        &self,
        name: &str,
        owner: &Address,
        coins: u64,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        let args = Args::new().add_string(name).add_string(&owner.to_string());
        let params = CallParams::new(self.address, "dnsAlloc")
            .with_args(args)
            .with_coins(coins)
            .with_options(options);
        self.manager.call_sc(params).await
    }

    /// Point `name` at `new_target`.
    pub async fn update_target(
        &self,
        name: &str,
        new_target: &Address,
        options: OperationOptions,
    ) -> Result<OperationHandle, OperationError> {
        let args = Args::new()
            .add_string(name)
            .add_string(&new_target.to_string());
        self.call("dnsUpdateTarget", args, options).await
    }

    /// Release `name`. Fails with [`OperationError::NameNotFound`] before
    /// submitting anything if the name is not registered.
    pub async fn free(&self, name: &str, options: OperationOptions) -> Result<OperationHandle, OperationError> {
        let token_id = self.token_id(name).await?;
        tracing::debug!(name, %token_id, "freeing name");
        self.call("dnsFree", Args::new().add_u256(token_id), options).await
    }

    async fn token_id(&self, name: &str) -> Result<U256, OperationError> {
        let values = self
            .manager
            .read_storage(&self.address, &[token_id_key(name)], true)
            .await?;
        match values.first() {
            Some(value) if !value.is_empty() => Ok(<U256 as FixedInt>::from_bytes(value)?),
            _ => Err(OperationError::NameNotFound {
                name: name.to_string(),
            }),
        }
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
