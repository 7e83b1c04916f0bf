//! Startup configuration. All values come from the environment or CLI
//! flags; there is no config file.

use {
    crate::error::ChompError,
    solana_sdk::{
        commitment_config::CommitmentConfig,
        signature::{Keypair, Signature},
    },
    std::{
        env, fs,
        path::{Path, PathBuf},
    },
};

pub const RPC_URL_ENV: &str = "CHOMP_RPC_URL";
pub const WS_URL_ENV: &str = "CHOMP_WS_URL";
pub const KEYPAIR_ENV: &str = "CHOMP_KEYPAIR";

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub rpc_url: String,
    pub ws_url: String,
    pub keypair_path: PathBuf,
}

impl Config {
    /// Read configuration from the environment, with CLI overrides applied
    /// on top by the caller.
    pub fn from_env() -> Config {
        let rpc_url = env::var(RPC_URL_ENV).unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
        let ws_url = env::var(WS_URL_ENV).unwrap_or_else(|_| ws_url_from_rpc(&rpc_url));
        let keypair_path = env::var(KEYPAIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_keypair_path());
        Config {
            rpc_url,
            ws_url,
            keypair_path,
        }
    }

    pub fn with_rpc_url(mut self, url: String) -> Config {
        self.ws_url = ws_url_from_rpc(&url);
        self.rpc_url = url;
        self
    }

    pub fn with_ws_url(mut self, url: String) -> Config {
        self.ws_url = url;
        self
    }

    pub fn with_keypair_path(mut self, path: PathBuf) -> Config {
        self.keypair_path = path;
        self
    }

    /// All reads and confirmations happen at `confirmed`, matching the
    /// original client.
    pub fn commitment(&self) -> CommitmentConfig {
        CommitmentConfig::confirmed()
    }

    /// Public-explorer link for the post-move toast line.
    pub fn explorer_url(&self, signature: &Signature) -> String {
        if self.rpc_url.contains("localhost") {
            format!(
                "https://explorer.solana.com/tx/{signature}?cluster=custom&customUrl=http%3A%2F%2Flocalhost%3A8899"
            )
        } else {
            format!("https://solscan.io/tx/{signature}")
        }
    }
}

/// Derive the websocket endpoint from an RPC endpoint the way the web3
/// clients do: flip the scheme, and bump a local validator's RPC port to
/// its pubsub port.
pub fn ws_url_from_rpc(rpc_url: &str) -> String {
    let ws = if let Some(rest) = rpc_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = rpc_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        rpc_url.to_string()
    };
    ws.replace(":8899", ":8900")
}

fn default_keypair_path() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => Path::new(&home).join(".config/solana/id.json"),
        None => PathBuf::from("id.json"),
    }
}

/// Load a JSON keypair file (the standard 64-byte array format written by
/// the Solana tooling).
pub fn load_keypair(path: &Path) -> Result<Keypair, ChompError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ChompError::Keypair(format!("{}: {e}", path.display())))?;
    let bytes: Vec<u8> =
        serde_json::from_str(&raw).map_err(|e| ChompError::Keypair(e.to_string()))?;
    Keypair::from_bytes(&bytes).map_err(|e| ChompError::Keypair(e.to_string()))
}
