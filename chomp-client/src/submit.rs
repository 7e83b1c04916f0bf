//! Move submission: sign, send, confirm, then read the confirmed
//! transaction back to learn what the program actually did.
//!
//! A move is at-most-once: any failure along the way leaves local history
//! untouched, and there is no retry of the submission itself. Only the
//! post-confirmation record fetch retries, because the RPC layer can lag a
//! freshly confirmed transaction.

use {
    crate::{
        config::Config,
        error::ChompError,
        instruction::{self, GameCommand},
        logs::{self, GameOutcome},
    },
    log::{debug, error, info},
    solana_client::{
        nonblocking::rpc_client::RpcClient,
        rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig},
    },
    solana_sdk::{
        pubkey::Pubkey,
        signature::{Keypair, Signature},
        signer::Signer,
        transaction::Transaction,
    },
    solana_transaction_status::{
        EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInstruction, UiMessage,
        UiParsedInstruction, UiTransactionEncoding,
    },
    std::{sync::Arc, time::Duration},
};

/// How many times to ask for the confirmed transaction record before
/// giving up on it.
pub const TX_FETCH_ATTEMPTS: usize = 5;

const TX_FETCH_BACKOFF: Duration = Duration::from_millis(500);

/// Everything a confirmed move taught us.
#[derive(Debug)]
pub struct MoveReport {
    pub signature: Signature,
    /// The (row, col) the program recorded for us, echoed back out of the
    /// transaction itself. `None` if the record never became visible.
    pub accepted: Option<(u8, u8)>,
    /// The opponent's reciprocal move, if the logs carried one.
    pub opponent: Option<(u8, u8)>,
    pub outcome: Option<GameOutcome>,
}

pub struct Submitter {
    rpc: Arc<RpcClient>,
    config: Config,
    signer: Option<Keypair>,
}

impl Submitter {
    pub fn new(rpc: Arc<RpcClient>, config: Config) -> Submitter {
        Submitter {
            rpc,
            config,
            signer: None,
        }
    }

    pub fn from_config(config: Config) -> Submitter {
        let rpc = Arc::new(RpcClient::new_with_commitment(
            config.rpc_url.clone(),
            config.commitment(),
        ));
        Submitter::new(rpc, config)
    }

    pub fn connect(&mut self, signer: Keypair) {
        self.signer = Some(signer);
    }

    pub fn disconnect(&mut self) {
        self.signer = None;
    }

    pub fn pubkey(&self) -> Option<Pubkey> {
        self.signer.as_ref().map(|kp| kp.pubkey())
    }

    /// Submit a move and reconstruct its effects from the confirmed record.
    pub async fn submit_move(&self, row: u8, col: u8) -> Result<MoveReport, ChompError> {
        let signature = self
            .send_and_confirm(GameCommand::Move { row, col })
            .await?;

        let tx = match self.fetch_transaction(&signature).await {
            Ok(tx) => tx,
            Err(err) => {
                error!("{err}, move history not updated");
                return Ok(MoveReport {
                    signature,
                    accepted: None,
                    opponent: None,
                    outcome: None,
                });
            }
        };

        let accepted = match accepted_command(&tx) {
            Some(GameCommand::Move { row, col }) => Some((row, col)),
            _ => None,
        };

        let report = match transaction_logs(&tx) {
            Some(lines) => logs::scan_logs(lines.iter().map(String::as_str)),
            None => {
                error!("no log messages found for transaction {signature}");
                logs::LogReport::default()
            }
        };

        info!(
            "move confirmed: {signature} ({})",
            self.config.explorer_url(&signature)
        );

        Ok(MoveReport {
            signature,
            accepted,
            opponent: report.opponent_move,
            outcome: report.outcome,
        })
    }

    /// Submit the reserved zero-byte forfeit command. The caller resets the
    /// session once this confirms.
    pub async fn submit_forfeit(&self) -> Result<Signature, ChompError> {
        self.send_and_confirm(GameCommand::Forfeit).await
    }

    async fn send_and_confirm(&self, command: GameCommand) -> Result<Signature, ChompError> {
        let signer = self.signer.as_ref().ok_or(ChompError::WalletNotConnected)?;

        let ix = instruction::build_instruction(&signer.pubkey(), command);
        let recent_blockhash = self.rpc.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[ix],
            Some(&signer.pubkey()),
            &[signer],
            recent_blockhash,
        );

        // skip_preflight matches the original client; the program is the
        // arbiter of move legality, not a simulation.
        let signature = self
            .rpc
            .send_transaction_with_config(
                &transaction,
                RpcSendTransactionConfig {
                    skip_preflight: true,
                    ..RpcSendTransactionConfig::default()
                },
            )
            .await?;
        info!("TXID: {signature}");

        self.rpc
            .confirm_transaction_with_spinner(
                &signature,
                &recent_blockhash,
                self.config.commitment(),
            )
            .await?;
        Ok(signature)
    }

    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> Result<EncodedConfirmedTransactionWithStatusMeta, ChompError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(self.config.commitment()),
            max_supported_transaction_version: Some(0),
        };
        for attempt in 1..=TX_FETCH_ATTEMPTS {
            match self
                .rpc
                .get_transaction_with_config(signature, config.clone())
                .await
            {
                Ok(tx) => return Ok(tx),
                Err(err) => {
                    debug!("transaction {signature} not yet visible (attempt {attempt}): {err}");
                    if let Some(delay) = backoff_after(attempt) {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
        Err(ChompError::TransactionNotFound {
            signature: *signature,
            attempts: TX_FETCH_ATTEMPTS,
        })
    }
}

/// Wait between fetch attempts, but not after the last one.
fn backoff_after(attempt: usize) -> Option<Duration> {
    (attempt < TX_FETCH_ATTEMPTS).then_some(TX_FETCH_BACKOFF)
}

/// Pull our program's instruction out of the parsed message and decode its
/// command byte. This is the authoritative echo of the move the program
/// recorded, which is trusted over whatever the user clicked.
fn accepted_command(tx: &EncodedConfirmedTransactionWithStatusMeta) -> Option<GameCommand> {
    let EncodedTransaction::Json(ui_tx) = &tx.transaction.transaction else {
        return None;
    };
    let UiMessage::Parsed(message) = &ui_tx.message else {
        return None;
    };
    let program_id = instruction::program::id().to_string();
    for ix in &message.instructions {
        if let UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(ix)) = ix {
            if ix.program_id == program_id {
                let data = bs58::decode(&ix.data).into_vec().ok()?;
                return GameCommand::from_byte(*data.first()?).ok();
            }
        }
    }
    None
}

fn transaction_logs(tx: &EncodedConfirmedTransactionWithStatusMeta) -> Option<Vec<String>> {
    tx.transaction
        .meta
        .as_ref()
        .and_then(|meta| Option::<Vec<String>>::from(meta.log_messages.clone()))
}
