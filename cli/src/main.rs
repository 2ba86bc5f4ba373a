use anyhow::Context;
use clap::Parser;
use squishy_core::{self as game, Game, LevelGenerator, Phase, Settings, Ticker};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

mod command;

use command::Command;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Play a fixed level, a JSON array of rows
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Settings file in TOML, missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Play the automatic parts in real time instead of skipping them
    #[arg(short, long)]
    animate: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {seed}");

    match &args.level {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read level {}", path.display()))?;
            let layout = game::Layout::from_json(&json)
                .with_context(|| format!("Could not parse level {}", path.display()))?;
            play(Game::with_generator(settings, layout, seed)?, args.animate)
        }
        None => play(Game::new(settings, seed)?, args.animate),
    }
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read settings {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid settings in {}", path.display()))
}

fn play<G: LevelGenerator>(mut game: Game<G>, animate: bool) -> anyhow::Result<()> {
    let mut ticker = Ticker::new(game.settings().pacing);
    settle(&mut game, &mut ticker, animate)?;
    render(&game);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Could not read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(error) => {
                println!("{error:#}");
                continue;
            }
        };
        ticker.poke();

        match command {
            Command::Move(direction) => {
                let outcome = game.move_in(direction);
                log::debug!("{direction:?}: {outcome:?}");
            }
            Command::Back => {
                game.move_backwards();
            }
            Command::Reset => {
                if !game.reset() {
                    println!("Nothing to rewind right now");
                }
            }
            Command::NewGame => game.new_game()?,
            Command::Drag(dx, dy) => {
                let drag = game.drag((dx, dy));
                log::debug!("drag moved {:?}, shape {:?}", drag.moves, drag.shape);
            }
            Command::Export => {
                println!("{}", game.map().to_layout().to_json()?);
                continue;
            }
            Command::Help => {
                println!("{}", command::HELP);
                continue;
            }
            Command::Quit => break,
        }

        settle(&mut game, &mut ticker, animate)?;
        render(&game);
    }
    Ok(())
}

/// Runs the automatic phases until the player is in control again.
fn settle<G: LevelGenerator>(
    game: &mut Game<G>,
    ticker: &mut Ticker,
    animate: bool,
) -> anyhow::Result<()> {
    if !animate {
        return Ok(game.run_until_ready()?);
    }

    let frame = Duration::from_millis(ticker.frame_ms().into());
    while game.phase() != Phase::Ready {
        if ticker.tick(game)?.is_some() {
            render(game);
        }
        thread::sleep(frame);
    }
    Ok(())
}

fn render<G: LevelGenerator>(game: &Game<G>) {
    let map = game.map();
    let mut out = io::stdout().lock();
    // clear screen and home the cursor
    let _ = write!(out, "\x1b[2J\x1b[H");
    let _ = write!(out, "{map}");
    let _ = writeln!(
        out,
        "level {}  value {}/{}  stars {:?}  {:?}",
        game.level(),
        map.player_value(),
        map.max_value(),
        map.stars().as_slice(),
        game.phase()
    );
    let _ = out.flush();
}
