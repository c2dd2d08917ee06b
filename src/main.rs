//! Recast Chess Demo Driver
//!
//! Plays a scripted match at 60 Hz, logs every notification, then replays
//! the recorded command log and checks the final state hash matches.
//!
//! Usage: `recast-chess [config.json]`

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use recast_chess::{
    Coord, MatchConfig, MatchController, Team, TICK_RATE, VERSION,
    core::fixed::{from_secs, Fixed, Secs, TICK_DURATION},
    core::hash::{short_hex, StateHash},
    game::{
        events::{GameEvent, GameEventData},
        input::{replay, Command, CommandLog},
    },
};

/// One line of the demo script.
enum Step {
    /// Click a cell
    Click(Team, i32, i32),
    /// Press a number key to pick a stock slot
    StockKey(Team, char),
    /// Let time pass, in whole seconds
    Wait(i32),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Recast Chess v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = match std::env::args().nth(1) {
        Some(path) => MatchConfig::load(&path).with_context(|| format!("loading config from {path}"))?,
        None => MatchConfig::default(),
    };

    let (log, live_hash) = demo_match(&config)?;
    verify_replay(&config, &log, live_hash)
}

/// The opening of a short game on the standard layout: a pawn trade, both
/// sides stocking a pawn, and Blue dropping its pawn back in to take the King.
fn script() -> Vec<Step> {
    use Step::*;
    vec![
        Click(Team::Blue, 1, 1),
        Click(Team::Blue, 1, 2),
        Click(Team::Red, 0, 3),
        Click(Team::Red, 0, 2),
        Wait(2),
        Click(Team::Blue, 1, 2),
        Click(Team::Blue, 1, 3),
        Click(Team::Red, 1, 4),
        Click(Team::Red, 1, 3),
        Wait(3),
        StockKey(Team::Blue, '1'),
        Click(Team::Blue, 1, 2),
        Wait(2),
        Click(Team::Blue, 1, 2),
        Click(Team::Blue, 1, 3),
        Wait(1),
    ]
}

/// Play the script live, returning the recorded command log and the final
/// state hash of the live match.
fn demo_match(config: &MatchConfig) -> Result<(CommandLog, StateHash)> {
    info!("=== Starting Demo Match ===");

    let mut game = MatchController::new(config)?;
    let mut log = CommandLog::new();
    info!(
        "Board {}x{}, {} pieces",
        game.board().width(),
        game.board().height(),
        game.board().pieces().count()
    );

    for step in script() {
        let commands = match step {
            Step::Click(team, x, y) => vec![Command::Activate { team, cell: Coord::new(x, y) }],
            Step::StockKey(team, key) => Command::from_stock_key(team, key).into_iter().collect(),
            Step::Wait(secs) => frames_until(game.elapsed().saturating_add(from_secs(secs)), game.elapsed()),
        };

        for command in commands {
            log.record(command);
            match command.apply(&mut game) {
                Ok(Some(interaction)) => info!("{:?} -> {:?}", command, interaction),
                Ok(None) => {}
                Err(err) => warn!("{:?} rejected: {}", command, err),
            }
            for event in game.take_events() {
                log_event(&event);
            }
        }
    }

    info!("=== Match Results ===");
    match game.is_game_ended() {
        (true, Some(winner)) => info!("Winner: {:?} after {}", winner, Secs(game.elapsed())),
        _ => info!("No winner after {}", Secs(game.elapsed())),
    }
    for team in Team::ALL {
        info!(
            "{:?}: {} pieces, {} in stock",
            team,
            game.board().pieces_of(team).count(),
            game.board().stock_of(team).len()
        );
    }
    let live_hash = game.compute_hash();
    info!("Final State Hash: {}", hex::encode(live_hash));
    info!("Commands recorded: {} ({})", log.len(), short_hex(&log.compute_hash()));

    Ok((log, live_hash))
}

/// Fixed-rate frames covering `from..target`.
fn frames_until(target: Fixed, from: Fixed) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut now = from;
    while now < target {
        commands.push(Command::Tick { dt: TICK_DURATION });
        now = now.saturating_add(TICK_DURATION);
    }
    commands
}

fn log_event(event: &GameEvent) {
    let at = Secs(event.elapsed);
    match &event.data {
        GameEventData::PieceMoved { piece_type, team, from, to, .. } => {
            info!("[{}] {:?} {:?} {} -> {}", at, team, piece_type, from, to);
        }
        GameEventData::PieceCaptured { piece_type, team, .. } => {
            info!("[{}] {:?} {:?} captured", at, team, piece_type);
        }
        GameEventData::StockAdded { piece_type, team, .. } => {
            info!("[{}] {:?} stocked a {:?}", at, team, piece_type);
        }
        GameEventData::StockReady { entry, team } => {
            info!("[{}] {:?} stock {:?} ready", at, team, entry);
        }
        GameEventData::PiecePlacedFromStock { piece_type, team, at: cell, .. } => {
            info!("[{}] {:?} recast {:?} at {}", at, team, piece_type, cell);
        }
        GameEventData::MatchEnded { winner } => {
            info!("[{}] Match ended! Winner: {:?}", at, winner);
        }
        other => tracing::debug!("[{}] {:?}", at, other),
    }
}

/// Replay the log on a fresh match and compare against the live match's hash.
fn verify_replay(config: &MatchConfig, log: &CommandLog, live_hash: StateHash) -> Result<()> {
    info!("=== Verifying Determinism ===");

    let (replayed, _) = replay(config, log.commands())?;
    let replay_hash = replayed.compute_hash();

    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if replay_hash == live_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        anyhow::bail!("DETERMINISM FAILURE: Hashes differ!")
    }
}
