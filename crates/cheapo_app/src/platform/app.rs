use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use cheapo_core::{update, AppState, Msg};
use engine_logging::{engine_info, engine_warn};

use super::config::{self, AppConfig};
use super::effects::EffectRunner;
use super::input::{parse_command, Command, HELP};
use super::{logging, ui};

const TICK_INTERVAL: Duration = Duration::from_millis(75);

/// Everything the main loop reacts to.
pub enum Inbox {
    Msg(Msg),
    Print(String),
    Quit,
}

pub fn run_app() -> anyhow::Result<()> {
    let path = config::config_path();
    let (config, config_error) = match config::load_from(&path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    logging::initialize(config.log_destination, config.log_level());
    if let Some(err) = config_error {
        engine_warn!("{err}; using defaults");
        eprintln!("{err}; using defaults");
    }
    engine_info!("cheapo_app starting, config {:?}", path);

    let (inbox_tx, inbox_rx) = mpsc::channel::<Inbox>();
    let effects = EffectRunner::new(config.fetch_settings(), inbox_tx.clone())
        .context("starting the HTTP engine")?;

    spawn_stdin_reader(inbox_tx.clone());
    spawn_ticker(inbox_tx);

    let mut stdout = io::stdout();
    let mut state = AppState::new();
    writeln!(stdout, "{}", ui::render::render(&state.view()))?;
    writeln!(stdout, "type `help` for commands")?;

    while let Ok(event) = inbox_rx.recv() {
        let msg = match event {
            Inbox::Msg(msg) => msg,
            Inbox::Print(text) => {
                writeln!(stdout, "{text}")?;
                continue;
            }
            Inbox::Quit => break,
        };

        let (next, effects_out) = update(state, msg);
        state = next;
        effects.run(effects_out);

        if state.consume_dirty() {
            writeln!(stdout, "{}", ui::render::render(&state.view()))?;
        }
    }

    engine_info!("cheapo_app exiting");
    Ok(())
}

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

fn spawn_stdin_reader(inbox: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let event = match parse_command(&line, now_ms()) {
                Ok(None) => continue,
                Ok(Some(Command::Send(msg))) => Inbox::Msg(msg),
                Ok(Some(Command::ListCategories)) => {
                    Inbox::Print(ui::render::render_categories())
                }
                Ok(Some(Command::Help)) => Inbox::Print(HELP.to_string()),
                Ok(Some(Command::Quit)) => Inbox::Quit,
                Err(err) => Inbox::Print(err.to_string()),
            };
            if inbox.send(event).is_err() {
                return;
            }
        }
        let _ = inbox.send(Inbox::Quit);
    });
}

/// Drives the viewport debounce.
fn spawn_ticker(inbox: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        while inbox
            .send(Inbox::Msg(Msg::Tick { now_ms: now_ms() }))
            .is_ok()
        {
            thread::sleep(TICK_INTERVAL);
        }
    });
}
