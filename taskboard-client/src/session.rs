//! Connection gate and the session it produces.
//!
//! A [`Session`] exists only after the gate has validated a contract address
//! and the provider has authorized an account. It is handed explicitly to the
//! sync engine and the dispatcher and dropped on reload or resubmission.

use crate::errors::{ClientError, ClientResult};
use crate::events::{BoardEvent, EventDispatcher};
use crate::ledger::TaskLedger;
use crate::provider::WalletProvider;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use taskboard_core::Address;
use uuid::Uuid;

#[derive(Clone)]
pub struct Session {
    pub id: Uuid,
    pub account: Address,
    pub contract: Address,
    pub network_id: u64,
    pub connected_at: DateTime<Utc>,
    ledger: Arc<dyn TaskLedger>,
}

impl Session {
    pub fn new(account: Address, contract: Address, network_id: u64, ledger: Arc<dyn TaskLedger>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account,
            contract,
            network_id,
            connected_at: Utc::now(),
            ledger,
        }
    }

    pub fn ledger(&self) -> &dyn TaskLedger {
        self.ledger.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("account", &self.account)
            .field("contract", &self.contract)
            .field("network_id", &self.network_id)
            .field("connected_at", &self.connected_at)
            .finish()
    }
}

/// Validates user-entered contract addresses and opens sessions.
pub struct ConnectionGate {
    provider: Option<Arc<dyn WalletProvider>>,
    events: Arc<EventDispatcher>,
}

impl ConnectionGate {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, events: Arc<EventDispatcher>) -> Self {
        Self { provider, events }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Parse a submitted address. Surrounding whitespace is not trimmed; the
    /// input must already be exactly `0x` plus 40 hex digits.
    pub fn validate(raw: &str) -> ClientResult<Address> {
        raw.parse::<Address>()
            .map_err(|_| ClientError::InvalidAddress(raw.to_string()))
    }

    /// Authorize an account with the provider and attach to `contract`.
    pub async fn connect(&self, contract: Address) -> ClientResult<Session> {
        let provider = self.provider.as_ref().ok_or(ClientError::ProviderAbsent)?;

        provider.request_accounts().await?;
        let account = provider
            .get_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ClientError::NoAccounts)?;
        let network_id = provider.get_network_id().await?;

        let session = Session::new(account, contract, network_id, provider.contract_at(contract));
        tracing::info!(
            "SESSION {}: connected as {} to contract {} on network {}",
            session.id,
            account,
            contract,
            network_id
        );
        self.events.emit(BoardEvent::Connected {
            account,
            contract,
            network_id,
        });
        Ok(session)
    }
}
