use std::time::Duration;

/// Endpoint baked in at build time via `TASKBOARD_PROVIDER_URL`.
pub const DEFAULT_PROVIDER_URL: Option<&str> = option_env!("TASKBOARD_PROVIDER_URL");

/// Contract address baked in at build time via `TASKBOARD_CONTRACT_ADDRESS`.
pub const DEFAULT_CONTRACT_ADDRESS: Option<&str> = option_env!("TASKBOARD_CONTRACT_ADDRESS");

const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// JSON-RPC endpoint (`http(s)://` or `ws(s)://`). `None` means no provider.
    pub provider_url: Option<String>,
    /// Raw address to submit to the gate on startup, if any.
    pub contract_address: Option<String>,
    /// How often to ask the node whether a submitted transaction was mined.
    pub receipt_poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.map(str::to_string),
            contract_address: DEFAULT_CONTRACT_ADDRESS.map(str::to_string),
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }
}

impl ClientConfig {
    pub fn with_provider(mut self, url: impl Into<String>) -> Self {
        self.provider_url = Some(url.into());
        self
    }

    pub fn with_contract(mut self, address: impl Into<String>) -> Self {
        self.contract_address = Some(address.into());
        self
    }

    pub fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self
    }
}
