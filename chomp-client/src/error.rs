use solana_sdk::signature::Signature;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChompError {
    #[error("No wallet connected")]
    WalletNotConnected,

    #[error("RPC request failed: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Transaction {signature} not found after {attempts} attempts")]
    TransactionNotFound {
        signature: Signature,
        attempts: usize,
    },

    #[error("Malformed command byte {0:#04x}")]
    MalformedCommand(u8),

    #[error("Failed to load keypair: {0}")]
    Keypair(String),
}
