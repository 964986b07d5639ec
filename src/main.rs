//////////////////////////
// main.rs
//////////////////////////
//
// Terminal front end: local two-player games, games against the random
// bot, online games through the relay, and the relay itself.

use std::io::{self, Write};
use std::net::IpAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use chess_duel::client;
use chess_duel::config::{BotConfig, ClientConfig, ServerConfig, DEFAULT_BOT_DELAY_MS, DEFAULT_PORT};
use chess_duel::protocol::{ClientMessage, ServerMessage};
use chess_duel::{start_server, BotPlayer, Color, GameEngine, GameStatus, MoveRequest, ParseError, Session, Square};

type Input = Lines<BufReader<Stdin>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chess for two: one terminal, a random bot, or online through a relay", long_about = None)]
struct Args {
    /// Log filter, e.g. "info" or "chess_duel=debug"
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Two players sharing this terminal
    Local,
    /// Play against the random bot
    Bot {
        /// Color the bot plays
        #[arg(long, default_value = "black")]
        color: Color,
        /// Pause before the bot answers, in milliseconds
        #[arg(long, default_value_t = DEFAULT_BOT_DELAY_MS)]
        delay_ms: u64,
        /// Seed for reproducible bot games
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Find an opponent through a relay
    Online {
        #[arg(long, env = "CHESS_DUEL_URL", default_value_t = ClientConfig::default().url)]
        url: String,
    },
    /// Run the matchmaking relay
    Serve {
        #[arg(long, env = "CHESS_DUEL_HOST", default_value = "127.0.0.1")]
        host: IpAddr,
        #[arg(long, env = "CHESS_DUEL_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

/// What a player can type during a game.
#[derive(Debug, PartialEq)]
enum GameCommand {
    Move(MoveRequest),
    Targets(Square),
    Undo,
    Redo,
    New,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<GameCommand, ParseError> {
    let mut words = line.split_whitespace();
    let first = words.next().unwrap_or("");
    match first {
        "undo" => Ok(GameCommand::Undo),
        "redo" => Ok(GameCommand::Redo),
        "new" => Ok(GameCommand::New),
        "help" | "?" => Ok(GameCommand::Help),
        "quit" | "exit" => Ok(GameCommand::Quit),
        "moves" => {
            let sq = words.next().unwrap_or("");
            Ok(GameCommand::Targets(sq.parse()?))
        }
        _ => Ok(GameCommand::Move(line.parse()?)),
    }
}

fn print_help() {
    println!("  e2e4        - move a piece");
    println!("  moves e2    - list legal targets of a piece");
    println!("  undo / redo - step through the game");
    println!("  new         - start over");
    println!("  quit        - leave the game");
}

fn render(engine: &GameEngine) -> String {
    let board = engine.board();
    let highlighted: Vec<Square> = engine
        .last_move()
        .map(|mv| vec![mv.from, mv.to])
        .unwrap_or_default();
    let checked_king = match engine.status() {
        GameStatus::Check(color) => board.king_square(color),
        GameStatus::Checkmate { winner } => board.king_square(winner.opposite()),
        _ => None,
    };

    let diagram = board.render(|sq, symbol| {
        if Some(sq) == checked_king {
            symbol.on_red().to_string()
        } else if highlighted.contains(&sq) {
            symbol.on_yellow().to_string()
        } else {
            symbol.to_string()
        }
    });

    let mut out = format!("\n{}\n", diagram);
    out.push_str(&format!(
        "\nTurn: {}   [undo {}] [redo {}]",
        engine.side_to_move(),
        if engine.can_undo() { "on" } else { "off" },
        if engine.can_redo() { "on" } else { "off" },
    ));
    out
}

fn announce(status: GameStatus) {
    match status {
        GameStatus::InProgress => {}
        GameStatus::Check(_) => println!("{}", status.to_string().yellow().bold()),
        _ => println!("\n{}\n", status.to_string().green().bold()),
    }
}

async fn prompt(input: &mut Input, text: &str) -> Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    Ok(input.next_line().await?.map(|l| l.trim().to_string()))
}

/// Local and bot games share one loop; only the opponent differs.
async fn play_offline(mut session: Session, input: &mut Input) -> Result<()> {
    print_help();
    loop {
        println!("{}", render(session.engine()));

        if session.bot_to_move() {
            println!("Bot is thinking...");
            match session.bot_reply().await {
                Some(Ok(status)) => announce(status),
                Some(Err(e)) => warn!("bot produced an illegal move: {}", e),
                None => println!("The bot has no move left."),
            }
            continue;
        }

        let text = format!("{} to move> ", session.engine().side_to_move());
        let Some(line) = prompt(input, &text).await? else {
            break;
        };
        if line.is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(GameCommand::Move(mv)) => match session.play(mv) {
                Ok(status) => announce(status),
                Err(e) => println!("{} {}", "Illegal move:".red(), e),
            },
            Ok(GameCommand::Targets(sq)) => {
                let targets = session.engine().legal_targets(sq);
                if targets.is_empty() {
                    println!("No legal moves from {}", sq);
                } else {
                    let list: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
                    println!("{}: {}", sq, list.join(" "));
                }
            }
            Ok(GameCommand::Undo) => {
                if !session.undo() {
                    println!("Nothing to undo");
                }
            }
            Ok(GameCommand::Redo) => {
                if !session.redo() {
                    println!("Nothing to redo");
                }
            }
            Ok(GameCommand::New) => {
                session.reset();
            }
            Ok(GameCommand::Help) => print_help(),
            Ok(GameCommand::Quit) => break,
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
    Ok(())
}

async fn play_online(config: &ClientConfig, input: &mut Input) -> Result<()> {
    let mut conn = client::connect(config).await?;
    conn.send(ClientMessage::FindGame);
    println!("Connected to {}. Looking for an opponent (type 'quit' to give up)...", config.url);

    let (seat, room_id) = loop {
        tokio::select! {
            msg = conn.recv() => match msg {
                Some(ServerMessage::Waiting) => println!("Waiting for opponent..."),
                Some(ServerMessage::GameStart { color, room_id }) => break (color, room_id),
                Some(other) => debug!("ignoring {:?} while matchmaking", other),
                None => bail!("Connection lost"),
            },
            line = input.next_line() => match line? {
                Some(l) if l.trim() == "quit" => {
                    conn.send(ClientMessage::LeaveGame);
                    return Ok(());
                }
                Some(_) => println!("Still waiting for an opponent..."),
                None => return Ok(()),
            },
        }
    };

    println!("{}", format!("Game found! You play {}.", seat).green().bold());
    let mut session = Session::online(seat, room_id, conn.sender());

    loop {
        println!("{}", render(session.engine()));
        if session.engine().status().is_over() {
            println!("Game over. Type 'quit' to leave.");
        } else if session.is_local_turn() {
            print!("Your move> ");
        } else {
            print!("Waiting for opponent> ");
        }
        io::stdout().flush()?;

        tokio::select! {
            msg = conn.recv() => match msg {
                Some(ServerMessage::OpponentMove { mv }) => match session.apply_remote(mv) {
                    Ok(status) => announce(status),
                    Err(e) => warn!("opponent sent an unusable move {:?}: {}", mv, e),
                },
                Some(ServerMessage::OpponentLeft) => {
                    println!("\n{}", "Opponent left the game".red().bold());
                    break;
                }
                Some(other) => debug!("ignoring {:?} during a game", other),
                None => {
                    println!("\n{}", "Connection lost".red().bold());
                    break;
                }
            },
            line = input.next_line() => {
                let Some(line) = line? else {
                    session.leave();
                    break;
                };
                match parse_command(line.trim()) {
                    Ok(GameCommand::Move(mv)) => match session.play(mv) {
                        Ok(status) => announce(status),
                        Err(e) => println!("{} {}", "Illegal move:".red(), e),
                    },
                    Ok(GameCommand::Targets(sq)) => {
                        let list: Vec<String> =
                            session.engine().legal_targets(sq).iter().map(|t| t.to_string()).collect();
                        println!("{}: {}", sq, list.join(" "));
                    }
                    Ok(GameCommand::Undo | GameCommand::Redo | GameCommand::New) => {
                        println!("Not available in online games");
                    }
                    Ok(GameCommand::Help) => print_help(),
                    Ok(GameCommand::Quit) => {
                        session.leave();
                        break;
                    }
                    Err(e) if line.trim().is_empty() => debug!("empty input: {}", e),
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
        }
    }

    // Give the writer task a moment to flush a pending leave_game.
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}

async fn run(command: Command, input: &mut Input) -> Result<()> {
    match command {
        Command::Local => play_offline(Session::local(), input).await,
        Command::Bot { color, delay_ms, seed } => {
            let config = BotConfig {
                think_delay: Duration::from_millis(delay_ms),
                seed,
            };
            println!("Playing against the bot (bot is {}).", color);
            play_offline(Session::against_bot(color, BotPlayer::new(&config)), input).await
        }
        Command::Online { url } => play_online(&ClientConfig { url }, input).await,
        Command::Serve { host, port } => {
            let config = ServerConfig::new(host, port);
            println!("Relay listening on ws://{}/ (Ctrl-C to stop)", config.addr);
            start_server(&config)
                .await
                .with_context(|| format!("relay failed on {}", config.addr))
        }
    }
}

async fn menu(input: &mut Input) -> Result<()> {
    println!("{}", "Welcome to chess_duel!".bold());
    loop {
        println!("\nCommands:");
        println!("  play local    - Two players on this terminal");
        println!("  play bot      - Play White against the random bot");
        println!("  play online   - Find an opponent on ws://localhost:{}/", DEFAULT_PORT);
        println!("  serve         - Run the relay on port {}", DEFAULT_PORT);
        println!("  quit          - Exit");

        let Some(line) = prompt(input, "> ").await? else {
            return Ok(());
        };
        let command = match line.as_str() {
            "quit" | "exit" => {
                println!("Goodbye!");
                return Ok(());
            }
            "play local" => Command::Local,
            "play bot" => Command::Bot {
                color: Color::Black,
                delay_ms: DEFAULT_BOT_DELAY_MS,
                seed: None,
            },
            "play online" => Command::Online {
                url: ClientConfig::default().url,
            },
            "serve" => Command::Serve {
                host: ServerConfig::default().addr.ip(),
                port: DEFAULT_PORT,
            },
            "" => continue,
            other => {
                println!("Unknown command: {}", other);
                continue;
            }
        };
        if let Err(e) = run(command, input).await {
            println!("{} {:#}", "Error:".red(), e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new().parse_filters(&args.log_level).init();

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    match args.command {
        Some(command) => run(command, &mut input).await,
        None => menu(&mut input).await,
    }
}
