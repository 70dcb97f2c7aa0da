use crate::config::ClientConfig;
use crate::errors::{ClientError, ClientResult};
use crate::ledger::{ContractLedger, TaskLedger};
use crate::transport::{self, RpcTransport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use taskboard_core::rpc::{methods, parse_quantity, METHOD_NOT_FOUND};
use taskboard_core::{Address, LedgerError};

/// Account access and contract attachment offered by a wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet to authorize this client. May wait on the user.
    async fn request_accounts(&self) -> ClientResult<Vec<Address>>;

    async fn get_accounts(&self) -> ClientResult<Vec<Address>>;

    async fn get_network_id(&self) -> ClientResult<u64>;

    /// Handle to the task contract deployed at `address`.
    fn contract_at(&self, address: Address) -> Arc<dyn TaskLedger>;
}

/// Wallet backed by a node that manages unlocked accounts and signs
/// `eth_sendTransaction` on their behalf.
pub struct JsonRpcProvider {
    transport: Arc<dyn RpcTransport>,
    receipt_poll_interval: Duration,
}

impl JsonRpcProvider {
    pub fn new(transport: Arc<dyn RpcTransport>, receipt_poll_interval: Duration) -> Self {
        Self {
            transport,
            receipt_poll_interval,
        }
    }

    /// Locate the configured provider. Any failure to reach one, including no
    /// endpoint being configured at all, is reported as
    /// [`ClientError::ProviderAbsent`].
    pub async fn discover(config: &ClientConfig) -> ClientResult<Self> {
        let Some(url) = config.provider_url.as_deref() else {
            tracing::warn!("No provider endpoint configured");
            return Err(ClientError::ProviderAbsent);
        };

        let transport = match transport::connect(url).await {
            Ok(transport) => transport,
            Err(e) => {
                tracing::warn!("Provider at {} unavailable: {}", url, e);
                return Err(ClientError::ProviderAbsent);
            }
        };

        let provider = Self::new(transport, config.receipt_poll_interval);
        if let Err(e) = provider.get_network_id().await {
            tracing::warn!("Provider at {} did not answer net_version: {}", url, e);
            return Err(ClientError::ProviderAbsent);
        }
        tracing::info!("Using provider at {}", url);
        Ok(provider)
    }

    fn parse_accounts(value: Value) -> ClientResult<Vec<Address>> {
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> ClientResult<Vec<Address>> {
        match self
            .transport
            .request(methods::REQUEST_ACCOUNTS, json!([]))
            .await
        {
            Ok(value) => Self::parse_accounts(value),
            // Development nodes expose their unlocked accounts without an
            // authorization step
            Err(ClientError::Ledger(LedgerError::Rpc { code, .. })) if code == METHOD_NOT_FOUND => {
                tracing::debug!("{} unsupported, falling back to {}", methods::REQUEST_ACCOUNTS, methods::ACCOUNTS);
                self.get_accounts().await
            }
            Err(e) => Err(e),
        }
    }

    async fn get_accounts(&self) -> ClientResult<Vec<Address>> {
        let value = self.transport.request(methods::ACCOUNTS, json!([])).await?;
        Self::parse_accounts(value)
    }

    async fn get_network_id(&self) -> ClientResult<u64> {
        let value = self.transport.request(methods::NET_VERSION, json!([])).await?;
        let raw = value
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string());
        Ok(parse_quantity(&raw)?)
    }

    fn contract_at(&self, address: Address) -> Arc<dyn TaskLedger> {
        Arc::new(ContractLedger::new(
            self.transport.clone(),
            address,
            self.receipt_poll_interval,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_endpoint_is_provider_absent() {
        let config = ClientConfig {
            provider_url: None,
            ..ClientConfig::default()
        };
        let result = JsonRpcProvider::discover(&config).await;
        assert!(matches!(result, Err(ClientError::ProviderAbsent)));
    }

    #[tokio::test]
    async fn test_bad_scheme_is_provider_absent() {
        let config = ClientConfig::default().with_provider("ipc:///tmp/geth.ipc");
        let result = JsonRpcProvider::discover(&config).await;
        assert!(matches!(result, Err(ClientError::ProviderAbsent)));
    }
}
