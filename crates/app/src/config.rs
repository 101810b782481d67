//! Configuration loading and validation.
//!
//! Configuration is a TOML file with four sections; every field has a
//! testnet default matching the campaign's current deployment, so a bare
//! `AppConfig::testnet()` is immediately usable.
//!
//! # Example Configuration
//!
//! ```toml
//! [network]
//! passphrase = "Test SDF Network ; September 2015"
//!
//! [endpoints]
//! horizon_url = "https://horizon-testnet.stellar.org"
//! rpc_url = "https://soroban-testnet.stellar.org"
//!
//! [campaign]
//! contract_id = "CB6N6KROTOYLECXYGUBVW6HMWUJYIOLDKLYYRBO4RRAQINS4PMP3SIWI"
//! recipient = "GCLT3ZVPSKGICZXOF5I5JFLATWGE4BSZCCCLMGC7TO7DJ7IC3U2ZBRUG"
//! poll_interval_secs = 10
//!
//! [donation]
//! base_fee = 100
//! tx_timeout_secs = 30
//! settle_delay_ms = 4000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use novafund_common::{Error, NetworkId, Result, network::TESTNET_PASSPHRASE};
use novafund_crypto::strkey;

/// Campaign contract of the current testnet deployment.
pub const DEFAULT_CONTRACT_ID: &str = "CB6N6KROTOYLECXYGUBVW6HMWUJYIOLDKLYYRBO4RRAQINS4PMP3SIWI";

/// Recipient of donation payments; doubles as the simulation source when
/// no wallet is connected.
pub const DEFAULT_RECIPIENT: &str = "GCLT3ZVPSKGICZXOF5I5JFLATWGE4BSZCCCLMGC7TO7DJ7IC3U2ZBRUG";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Network identity.
    #[serde(default)]
    pub network: NetworkSettings,

    /// Server endpoints.
    #[serde(default)]
    pub endpoints: EndpointSettings,

    /// Campaign wiring.
    #[serde(default)]
    pub campaign: CampaignSettings,

    /// Donation flow tuning.
    #[serde(default)]
    pub donation: DonationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

impl AppConfig {
    /// Returns the testnet configuration of the current deployment.
    pub fn testnet() -> Self {
        Self {
            network: NetworkSettings::default(),
            endpoints: EndpointSettings::default(),
            campaign: CampaignSettings::default(),
            donation: DonationSettings::default(),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.network.passphrase.trim().is_empty() {
            return Err(Error::Config("network passphrase is empty".to_string()));
        }
        if self.endpoints.horizon_url.trim().is_empty() {
            return Err(Error::Config("horizon_url is empty".to_string()));
        }
        if self.endpoints.rpc_url.trim().is_empty() {
            return Err(Error::Config("rpc_url is empty".to_string()));
        }
        strkey::decode_contract_id(&self.campaign.contract_id)
            .map_err(|e| Error::Config(format!("bad contract_id: {e}")))?;
        strkey::decode_account_id(&self.campaign.recipient)
            .map_err(|e| Error::Config(format!("bad recipient: {e}")))?;
        strkey::decode_account_id(&self.campaign.fallback_source)
            .map_err(|e| Error::Config(format!("bad fallback_source: {e}")))?;
        if self.campaign.poll_interval_secs == 0 {
            return Err(Error::Config("poll_interval_secs must be positive".to_string()));
        }
        if self.donation.base_fee < 100 {
            return Err(Error::Config(
                "base_fee below the network minimum of 100 stroops".to_string(),
            ));
        }
        if self.donation.tx_timeout_secs == 0 {
            return Err(Error::Config("tx_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Network identity section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSettings {
    /// The network passphrase; its SHA-256 is the network ID.
    pub passphrase: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            passphrase: TESTNET_PASSPHRASE.to_string(),
        }
    }
}

impl NetworkSettings {
    /// Derives the network ID from the passphrase.
    pub fn network_id(&self) -> NetworkId {
        NetworkId::from_passphrase(&self.passphrase)
    }
}

/// Server endpoints section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSettings {
    /// Horizon base URL (account reads).
    pub horizon_url: String,
    /// Soroban RPC URL (simulation and submission).
    pub rpc_url: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            horizon_url: "https://horizon-testnet.stellar.org".to_string(),
            rpc_url: "https://soroban-testnet.stellar.org".to_string(),
        }
    }
}

/// Campaign wiring section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignSettings {
    /// The campaign contract (C-strkey).
    pub contract_id: String,
    /// Destination of donation payments (G-strkey).
    pub recipient: String,
    /// Source account used for read-only simulations when no wallet is
    /// connected. Simulation needs *a* funded source even though it
    /// mutates nothing.
    pub fallback_source: String,
    /// Campaign state poll interval in seconds.
    pub poll_interval_secs: u64,
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            contract_id: DEFAULT_CONTRACT_ID.to_string(),
            recipient: DEFAULT_RECIPIENT.to_string(),
            fallback_source: DEFAULT_RECIPIENT.to_string(),
            poll_interval_secs: 10,
        }
    }
}

impl CampaignSettings {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Donation flow tuning section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DonationSettings {
    /// Base transaction fee in stroops.
    pub base_fee: u32,
    /// Envelope expiry horizon in seconds from build time.
    pub tx_timeout_secs: u64,
    /// Fixed settling delay between the payment and record legs, in
    /// milliseconds. An optimistic wait, not a confirmation.
    pub settle_delay_ms: u64,
}

impl Default for DonationSettings {
    fn default() -> Self {
        Self {
            base_fee: 100,
            tx_timeout_secs: 30,
            settle_delay_ms: 4_000,
        }
    }
}

impl DonationSettings {
    /// Settling delay as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
