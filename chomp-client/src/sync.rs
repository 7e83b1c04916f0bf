//! Board reconciliation against the on-chain game account.
//!
//! Two channels feed one consumer: an account-change subscription for low
//! latency, and a 1-second poll that covers missed or delayed
//! notifications. Both funnel through a single `apply` that updates only
//! when the decoded board differs from the last one seen, so a stale
//! second arrival never produces a duplicate render.

use {
    crate::{board::Board, error::ChompError, instruction},
    futures_util::StreamExt,
    log::{debug, warn},
    solana_account_decoder::UiAccountEncoding,
    solana_client::{
        nonblocking::{pubsub_client::PubsubClient, rpc_client::RpcClient},
        rpc_config::RpcAccountInfoConfig,
    },
    solana_sdk::{account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey},
    std::{
        sync::{Arc, Mutex},
        time::Duration,
    },
    tokio::{sync::watch, task::JoinHandle},
};

/// Pull-channel period.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Shared last-known-board cell. Both channels go through `apply`, which
/// is the single writer.
struct Reconciler {
    last: Mutex<Option<Board>>,
    tx: watch::Sender<Option<Board>>,
}

impl Reconciler {
    fn new(tx: watch::Sender<Option<Board>>) -> Reconciler {
        Reconciler {
            last: Mutex::new(None),
            tx,
        }
    }

    /// Decode account data and publish it if it changed. Empty or short
    /// data is an uninitialized account and produces no update.
    fn apply(&self, data: &[u8]) {
        let Some(board) = Board::decode(data) else {
            return;
        };
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if last.as_ref() == Some(&board) {
            return;
        }
        *last = Some(board);
        self.tx.send_replace(Some(board));
    }
}

/// Live synchronizer for one wallet's game account.
///
/// Dropping it tears both channels down; callers must drop the old one
/// before starting a synchronizer for a new wallet so that a single game
/// account never has two of them.
pub struct GameSync {
    rx: watch::Receiver<Option<Board>>,
    poll: JoinHandle<()>,
    push: JoinHandle<()>,
}

impl GameSync {
    pub fn start(rpc_url: String, ws_url: String, player: &Pubkey) -> GameSync {
        let game_key = instruction::game_address(player);
        let (tx, rx) = watch::channel(None);
        let reconciler = Arc::new(Reconciler::new(tx));

        let poll = tokio::spawn(poll_account(rpc_url, game_key, Arc::clone(&reconciler)));
        let push = tokio::spawn(watch_account(ws_url, game_key, reconciler));

        GameSync { rx, poll, push }
    }

    /// Receiver holding the latest deduplicated board.
    pub fn watch(&self) -> watch::Receiver<Option<Board>> {
        self.rx.clone()
    }

    pub fn shutdown(&self) {
        self.poll.abort();
        self.push.abort();
    }
}

impl Drop for GameSync {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One-shot fetch of the current board, for non-interactive commands.
/// `None` covers both a missing account and one with no data yet.
pub async fn fetch_board(rpc_url: &str, player: &Pubkey) -> Result<Option<Board>, ChompError> {
    let rpc = RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed());
    let game_key = instruction::game_address(player);
    let response = rpc
        .get_account_with_commitment(&game_key, CommitmentConfig::confirmed())
        .await?;
    Ok(response.value.and_then(|account| Board::decode(&account.data)))
}

async fn poll_account(rpc_url: String, game_key: Pubkey, reconciler: Arc<Reconciler>) {
    let rpc = RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed());
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        interval.tick().await;
        match rpc
            .get_account_with_commitment(&game_key, CommitmentConfig::confirmed())
            .await
        {
            Ok(response) => {
                if let Some(account) = response.value {
                    reconciler.apply(&account.data);
                }
            }
            Err(err) => debug!("poll of {game_key} failed: {err}"),
        }
    }
}

async fn watch_account(ws_url: String, game_key: Pubkey, reconciler: Arc<Reconciler>) {
    let client = match PubsubClient::new(&ws_url).await {
        Ok(client) => client,
        Err(err) => {
            warn!("account subscription unavailable, polling only: {err}");
            return;
        }
    };
    let config = RpcAccountInfoConfig {
        encoding: Some(UiAccountEncoding::Base64),
        data_slice: None,
        commitment: Some(CommitmentConfig::confirmed()),
        min_context_slot: None,
    };
    let (mut stream, unsubscribe) = match client.account_subscribe(&game_key, Some(config)).await {
        Ok(subscription) => subscription,
        Err(err) => {
            warn!("account subscription failed, polling only: {err}");
            return;
        }
    };
    while let Some(update) = stream.next().await {
        if let Some(account) = update.value.decode::<Account>() {
            reconciler.apply(&account.data);
        }
    }
    unsubscribe().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_publishes_only_on_change() {
        let (tx, rx) = watch::channel(None);
        let reconciler = Reconciler::new(tx);

        let first = [0x80, 0, 0, 0, 0];
        reconciler.apply(&first);
        assert_eq!(*rx.borrow(), Board::decode(&first));

        // identical board from the other channel: no new value
        let mut rx2 = rx.clone();
        rx2.borrow_and_update();
        reconciler.apply(&first);
        assert!(!rx2.has_changed().unwrap());

        let second = [0xc0, 0x80, 0, 0, 0];
        reconciler.apply(&second);
        assert!(rx2.has_changed().unwrap());
        assert_eq!(*rx2.borrow_and_update(), Board::decode(&second));
    }

    #[test]
    fn apply_ignores_uninitialized_accounts() {
        let (tx, rx) = watch::channel(None);
        let reconciler = Reconciler::new(tx);

        reconciler.apply(&[]);
        reconciler.apply(&[1, 2]);
        assert_eq!(*rx.borrow(), None);
    }

    #[tokio::test]
    async fn shutdown_stops_both_tasks() {
        let mut sync = GameSync::start(
            "http://localhost:8899".to_string(),
            "ws://localhost:8900".to_string(),
            &Pubkey::new_unique(),
        );
        sync.shutdown();
        // the poll loop never exits on its own, so it must have been aborted
        assert!((&mut sync.poll).await.unwrap_err().is_cancelled());
        // the push task may have already bailed out (no websocket endpoint)
        let _ = (&mut sync.push).await;
    }
}
