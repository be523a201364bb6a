use crate::{error::ConnectorError, interface::InterfaceDescriptor};
use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentLevel, pubkey::Pubkey};
use std::str::FromStr;

/// The top-level configuration for the `festchain-connector` library.
///
/// This struct aggregates the Solana endpoint settings and the location of the
/// deployed program. It is typically deserialized from a configuration file
/// and used once at start-up to build a `RemoteLedgerHandle`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectorConfig {
    #[serde(default)]
    pub solana: Solana,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Defines the connection settings for the Solana cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Solana {
    pub rpc_url: String,
    #[serde(with = "serde_commitment")]
    pub commitment: CommitmentLevel,
}

/// Locates the deployed program and its interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LedgerConfig {
    /// Base58 address of the deployed program.
    pub program_id: String,
    /// Path to a JSON interface descriptor. The bundled FestManager descriptor is used when unset.
    pub interface_path: Option<String>,
}

impl Default for Solana {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8899".to_string(),
            commitment: CommitmentLevel::Confirmed,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            program_id: "FestMgr111111111111111111111111111111111111".to_string(),
            interface_path: None,
        }
    }
}

impl LedgerConfig {
    pub fn program_id(&self) -> Result<Pubkey, ConnectorError> {
        Pubkey::from_str(&self.program_id).map_err(|e| {
            ConnectorError::Interface(format!("invalid program id '{}': {e}", self.program_id))
        })
    }

    /// Loads the configured descriptor, or the bundled one.
    pub fn interface(&self) -> Result<InterfaceDescriptor, ConnectorError> {
        match &self.interface_path {
            Some(path) => InterfaceDescriptor::load(path),
            None => InterfaceDescriptor::fest_manager(),
        }
    }
}

mod serde_commitment {

    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(c: &CommitmentLevel, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match c {
            CommitmentLevel::Processed => "processed",
            CommitmentLevel::Confirmed => "confirmed",
            CommitmentLevel::Finalized => "finalized",
        };
        serializer.serialize_str(s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<CommitmentLevel, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "processed" => Ok(CommitmentLevel::Processed),
            "confirmed" => Ok(CommitmentLevel::Confirmed),
            "finalized" => Ok(CommitmentLevel::Finalized),
            other => Err(serde::de::Error::custom(format!(
                "unknown commitment level '{other}'"
            ))),
        }
    }
}
