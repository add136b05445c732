//! Proxy Lifecycle Manager
//!
//! Each account owns at most one DSProxy, created through the registry's
//! `build()`. Pool creation delegate-calls BActions through it so the
//! multi-step setup lands atomically.
//!
//! `ensure_proxy` is serialized per account inside this process, and the
//! registry is always re-read after a build so a proxy built by someone else
//! in the meantime is picked up instead of building a second one.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use evm_node_client::call_contract;
use evm_tx::FailureCause;
use tokio::sync::Mutex;

use crate::client::{Balancer, Result};
use crate::constants::IProxyRegistry;
use crate::state::BalancerError;

/// Per-account locks guarding proxy creation
#[derive(Clone, Default)]
pub struct ProxyManager {
    locks: Arc<Mutex<HashMap<Address, Arc<Mutex<()>>>>>,
}

impl ProxyManager {
    async fn lock_for(&self, account: Address) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(account).or_default().clone()
    }

    /// Forget the account's lock once no other caller holds or awaits it
    async fn release(&self, account: Address, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // The map and `lock` itself account for two references
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&account);
        }
    }
}

impl Balancer {
    /// Proxy registered for `account`, if any
    pub async fn resolve_proxy(&self, account: Address) -> Result<Option<Address>> {
        let proxy = call_contract(
            self.reader.as_ref(),
            self.config.contracts.proxy_registry,
            &IProxyRegistry::proxiesCall { owner: account },
        )
        .await?;

        Ok((proxy != Address::ZERO).then_some(proxy))
    }

    /// Proxy for `account`, building one through the registry if absent
    pub async fn ensure_proxy(&self, account: Address) -> Result<Address> {
        let lock = self.proxies.lock_for(account).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.build_proxy_if_absent(account).await
        };
        self.proxies.release(account, lock).await;
        outcome
    }

    async fn build_proxy_if_absent(&self, account: Address) -> Result<Address> {
        if let Some(proxy) = self.resolve_proxy(account).await? {
            tracing::debug!(%account, %proxy, "Proxy already registered");
            return Ok(proxy);
        }

        tracing::info!(%account, "Building proxy");
        let registry = self.config.contracts.proxy_registry;
        let outcome = self
            .submit(account, registry, &IProxyRegistry::buildCall {}, U256::ZERO)
            .await;

        match (self.resolve_proxy(account).await?, outcome) {
            (Some(proxy), Ok(result)) => {
                tracing::info!(%account, %proxy, tx_hash = %result.tx_hash, "Proxy built");
                Ok(proxy)
            }
            (Some(proxy), Err(cause)) => {
                tracing::warn!(
                    %account,
                    %proxy,
                    %cause,
                    "Build failed but a proxy is now registered, using it"
                );
                Ok(proxy)
            }
            (None, Err(cause)) => Err(BalancerError::ProxyCreation { account, cause }),
            (None, Ok(result)) => Err(BalancerError::ProxyCreation {
                account,
                cause: FailureCause::Reverted {
                    tx_hash: result.tx_hash,
                    reason: Some("registry reports no proxy after build".to_string()),
                },
            }),
        }
    }
}
