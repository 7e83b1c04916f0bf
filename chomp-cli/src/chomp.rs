use anyhow::Result;
use chomp_client::{
    board::{index_of, GLASS_INDEX},
    config::{self, Config},
    instruction,
    logs::GameOutcome,
    session::Session,
    submit::Submitter,
    sync::{self, GameSync},
    view,
};
use clap::{Args, Parser, Subcommand};
use solana_sdk::signer::Signer;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Parser)]
#[command(name = "chomp")]
#[command(
    about = "Terminal client for Chomping Glass, a Chomp-style game against an on-chain AI.",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalOpts {
    /// RPC endpoint (falls back to CHOMP_RPC_URL)
    #[arg(long)]
    url: Option<String>,

    /// Websocket endpoint (falls back to CHOMP_WS_URL, else derived from the RPC URL)
    #[arg(long)]
    ws_url: Option<String>,

    /// Path to a JSON keypair file (falls back to CHOMP_KEYPAIR)
    #[arg(long)]
    keypair: Option<PathBuf>,
}

impl GlobalOpts {
    fn apply(self, config: Config) -> Config {
        let mut config = match self.url {
            Some(url) => config.with_rpc_url(url),
            None => config,
        };
        if let Some(ws_url) = self.ws_url {
            config = config.with_ws_url(ws_url);
        }
        if let Some(keypair) = self.keypair {
            config = config.with_keypair_path(keypair);
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and render the current board once.
    Board,

    /// Play interactively against the on-chain AI.
    Play,

    /// Abandon the current game.
    Forfeit,

    /// Render the board on every on-chain change without playing.
    Watch,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.opts.apply(Config::from_env());

    match run(cli.command, config).await {
        Ok(()) => std::process::exit(exitcode::OK),
        Err(e) => {
            println!("Error: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    }
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Board => show_board(&config).await,
        Command::Play => play(&config).await,
        Command::Forfeit => forfeit(&config).await,
        Command::Watch => watch(&config).await,
    }
}

async fn show_board(config: &Config) -> Result<()> {
    let keypair = config::load_keypair(&config.keypair_path)?;
    let mut session = Session::new();
    match sync::fetch_board(&config.rpc_url, &keypair.pubkey()).await? {
        Some(board) => session.observe_board(board),
        None => println!("No game account yet; the board is untouched."),
    }
    print!("{}", view::render(&session));
    Ok(())
}

async fn forfeit(config: &Config) -> Result<()> {
    let keypair = config::load_keypair(&config.keypair_path)?;
    // same gate as the interactive Give Up: nothing to abandon until a
    // cell has been eaten
    match sync::fetch_board(&config.rpc_url, &keypair.pubkey()).await? {
        Some(board) if board.any_eaten() => {}
        _ => {
            println!("No game in progress to give up.");
            return Ok(());
        }
    }
    let mut submitter = Submitter::from_config(config.clone());
    submitter.connect(keypair);
    let signature = submitter.submit_forfeit().await?;
    println!(
        "Forfeited: {signature}\nView: {}",
        config.explorer_url(&signature)
    );
    Ok(())
}

async fn watch(config: &Config) -> Result<()> {
    let keypair = config::load_keypair(&config.keypair_path)?;
    let player = keypair.pubkey();
    println!(
        "Watching game account {} (ctrl-c to stop)",
        instruction::game_address(&player)
    );

    let game_sync = GameSync::start(config.rpc_url.clone(), config.ws_url.clone(), &player);
    let mut board_rx = game_sync.watch();
    let mut session = Session::new();
    while board_rx.changed().await.is_ok() {
        if let Some(board) = *board_rx.borrow_and_update() {
            session.observe_board(board);
            print!("{}", view::render(&session));
        }
    }
    Ok(())
}

/// One parsed line of player input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Move { row: u8, col: u8 },
    Forfeit,
    New,
    Quit,
    Empty,
}

/// Parse `row col` (both 1-indexed as displayed) or a keyword.
fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    match line {
        "" => return Ok(Input::Empty),
        "q" | "quit" => return Ok(Input::Quit),
        "forfeit" => return Ok(Input::Forfeit),
        "new" => return Ok(Input::New),
        _ => {}
    }
    let mut parts = line.split_whitespace();
    let usage = || "expected: <row> <col> (e.g. `2 5`), `forfeit`, `new` or `quit`".to_string();
    let row: u8 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(usage)?;
    let col: u8 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(usage)?;
    if parts.next().is_some() {
        return Err("too many values, expected: <row> <col>".to_string());
    }
    if !(1..=5).contains(&row) || !(1..=8).contains(&col) {
        return Err("row must be 1-5 and col 1-8".to_string());
    }
    Ok(Input::Move {
        row: row - 1,
        col: col - 1,
    })
}

fn print_rules() {
    println!("Pick a candy; you eat it and everything above and to its left.");
    println!("The bottom-right square is glass. Whoever eats the glass loses.");
    println!("Your moves are numbered in blue, the AI's in red.");
    println!("Enter `row col` to move, `forfeit` to give up, `quit` to leave.\n");
}

fn print_banner(session: &Session) {
    if let Some(popup) = &session.popup {
        if popup.as_str() == GameOutcome::Won.banner() {
            println!("  .  *  .  *  .  *  .");
            println!("  *  YOU BEAT THE AI *");
            println!("  .  *  .  *  .  *  .");
        }
        println!("Game over: {popup}");
        println!("Type `new` to start over, or `quit`.");
    }
}

async fn play(config: &Config) -> Result<()> {
    let keypair = config::load_keypair(&config.keypair_path)?;
    let player = keypair.pubkey();
    println!("Playing as {player}\n");
    print_rules();

    let mut submitter = Submitter::from_config(config.clone());
    submitter.connect(keypair);

    let game_sync = GameSync::start(config.rpc_url.clone(), config.ws_url.clone(), &player);
    let mut board_rx = game_sync.watch();

    let mut session = Session::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("{}", view::render(&session));
    println!("> ");

    loop {
        tokio::select! {
            changed = board_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                // a terminal board stays on screen until the player resets;
                // mark the update seen so `changed` does not fire again for it
                if session.game_over() {
                    board_rx.borrow_and_update();
                    continue;
                }
                if let Some(board) = *board_rx.borrow_and_update() {
                    session.observe_board(board);
                    print!("{}", view::render(&session));
                    println!("> ");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Empty) => {}
                    Ok(Input::New) => {
                        session.reset();
                        print!("{}", view::render(&session));
                    }
                    Ok(Input::Forfeit) => handle_forfeit(&submitter, &mut session).await,
                    Ok(Input::Move { row, col }) => {
                        handle_move(config, &submitter, &mut session, &mut lines, row, col).await?;
                    }
                    Err(msg) => println!("{msg}"),
                }
                println!("> ");
            }
        }
    }
    Ok(())
}

async fn handle_forfeit(submitter: &Submitter, session: &mut Session) {
    if !session.game_in_progress() {
        println!("No game in progress to give up.");
        return;
    }
    match submitter.submit_forfeit().await {
        Ok(signature) => {
            println!("Forfeited: {signature}");
            session.reset();
            print!("{}", view::render(session));
        }
        Err(err) => {
            // the original client reloaded the whole page here; starting the
            // session over and letting the synchronizer repopulate it is the
            // terminal equivalent
            log::warn!("forfeit failed, resetting session: {err}");
            session.reset();
        }
    }
}

async fn handle_move(
    config: &Config,
    submitter: &Submitter,
    session: &mut Session,
    lines: &mut Lines<BufReader<Stdin>>,
    row: u8,
    col: u8,
) -> Result<()> {
    let index = index_of(row, col);
    if session.game_over() {
        println!("The game is over. Type `new` to start another.");
        return Ok(());
    }
    if index == GLASS_INDEX {
        println!("That square is glass, not candy. Pick another.");
        return Ok(());
    }
    if session.board.map_or(false, |b| b.is_eaten(row, col)) {
        println!("That candy is already eaten.");
        return Ok(());
    }

    // show the would-be-eaten region before committing
    session.set_hover(Some(index));
    print!("{}", view::render(session));
    session.set_hover(None);
    println!("Eat the highlighted region? [y/N]");
    let confirm = lines.next_line().await?.unwrap_or_default();
    if !confirm.trim().eq_ignore_ascii_case("y") {
        println!("Cancelled.");
        return Ok(());
    }

    session.begin_move(index);
    print!("{}", view::render(session));
    println!("Submitting...");

    match submitter.submit_move(row, col).await {
        Ok(report) => {
            session.clear_pending();
            if let Some((r, c)) = report.accepted {
                session.record_local(r, c);
            }
            if let Some((r, c)) = report.opponent {
                session.record_opponent(r, c);
            }
            println!(
                "Confirmed: {}\nView: {}",
                report.signature,
                config.explorer_url(&report.signature)
            );
            if let Some(outcome) = report.outcome {
                session.finish(outcome);
            }
            print!("{}", view::render(session));
            print_banner(session);
        }
        Err(err) => {
            session.clear_pending();
            log::error!("move failed: {err}");
            println!("Move failed: {err}");
        }
    }
    Ok(())
}
