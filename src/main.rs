mod display;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;

use wave_shooter::clock::{Driver, InputSource};
use wave_shooter::config::MAX_NAME_LEN;
use wave_shooter::entities::{Difficulty, GameStatus, HeldKeys};
use wave_shooter::game::{Game, ScoreSink};
use wave_shooter::store::JsonFileStore;

use display::Viewport;

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key counts as held if its last press/repeat event arrived within this
/// many frames.  OS key-repeat is at least 15 Hz, so 8 frames (≈133 ms)
/// bridges the gaps on terminals without release events.
const HOLD_WINDOW: u64 = 8;

const SAVE_FILE: &str = ".wave_shooter.json";
const LOG_FILE: &str = "wave_shooter.log";

// ── Data directory & logging ──────────────────────────────────────────────────

fn data_dir() -> PathBuf {
    std::env::var("WAVE_SHOOTER_HOME")
        .or_else(|_| std::env::var("HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// The terminal is in raw mode, so logs go to a file.  Without one the game
/// simply runs unlogged.
fn init_logging(dir: &Path) {
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
    else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Stand-in for the arcade-wide score ledger: the bonus is only logged.
struct LoggedScoreSink;

impl ScoreSink for LoggedScoreSink {
    fn report_bonus(&mut self, units: u64) {
        tracing::info!(units, "arcade bonus reported");
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Held-key model: each key maps to the frame number of its last
/// press/repeat event, and counts as held while that is fresh.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire after `HOLD_WINDOW` frames of silence.
#[derive(Default)]
struct TerminalInput {
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
    pause_requested: bool,
}

impl TerminalInput {
    fn is_held(&self, key: &KeyCode) -> bool {
        self.key_frame
            .get(key)
            .map(|&last| self.frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    fn any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|k| self.is_held(k))
    }

    fn clear(&mut self) {
        self.key_frame.clear();
        self.pause_requested = false;
    }
}

impl InputSource for TerminalInput {
    fn held_keys(&self) -> HeldKeys {
        HeldKeys {
            left: self.any_held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
            right: self.any_held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
            fire: self.is_held(&KeyCode::Char(' ')),
        }
    }

    fn take_pause_request(&mut self) -> bool {
        std::mem::take(&mut self.pause_requested)
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Difficulty),
    Quit,
}

fn draw_menu<W: Write>(out: &mut W, game: &Game) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;
    let left = cx.saturating_sub(14);

    let title = "★  WAVE  SHOOTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(9),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    let stats = game.stats();
    let stats_line = format!(
        "Games {}  Kills {}  Best wave {}",
        stats.games_played, stats.enemies_defeated, stats.best_wave
    );
    out.queue(cursor::MoveTo(
        cx.saturating_sub(stats_line.chars().count() as u16 / 2),
        cy.saturating_sub(8),
    ))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print(&stats_line))?;

    out.queue(cursor::MoveTo(left, cy.saturating_sub(6)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select difficulty:"))?;

    let options: &[(&str, Difficulty, Color, &str)] = &[
        ("1", Difficulty::Easy, Color::Green, "Slow descent"),
        ("2", Difficulty::Normal, Color::Yellow, "Balanced challenge"),
        ("3", Difficulty::Hard, Color::Red, "Fast and relentless"),
        ("4", Difficulty::Insane, Color::Magenta, "Good luck"),
    ];
    let current = game.preferences().difficulty;
    for (i, (key, difficulty, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(5) + i as u16;
        let marker = if *difficulty == current { "›" } else { " " };
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("{marker}[{key}] ")))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", difficulty.label())))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("  {desc}")))?;
    }

    let prefs = game.preferences();
    let on_off = |b: bool| if b { "on" } else { "off" };
    out.queue(cursor::MoveTo(left, cy))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print(format!(
        "[S] Sound: {}   [F] Effects: {}",
        on_off(prefs.sound_enabled),
        on_off(prefs.effects_enabled)
    )))?;

    // High-score table
    out.queue(cursor::MoveTo(left, cy + 2))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print("High scores"))?;
    for (i, entry) in game.ledger().entries().iter().enumerate() {
        out.queue(cursor::MoveTo(left, cy + 3 + i as u16))?;
        out.queue(style::SetForegroundColor(if i == 0 { Color::Yellow } else { Color::White }))?;
        out.queue(Print(format!(
            "{:>2}. {:<10} {:>7}  w{}",
            i + 1,
            entry.name,
            entry.score,
            entry.wave
        )))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    game: &mut Game,
) -> std::io::Result<MenuResult> {
    draw_menu(out, game)?;

    // Block until the user makes a choice
    loop {
        let (code, kind) = match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind, .. })) => (code, kind),
            Ok(_) => continue,
            // Input thread is gone
            Err(_) => return Ok(MenuResult::Quit),
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        match code {
            KeyCode::Char('1') => return Ok(MenuResult::Start(Difficulty::Easy)),
            KeyCode::Char('2') => return Ok(MenuResult::Start(Difficulty::Normal)),
            KeyCode::Char('3') => return Ok(MenuResult::Start(Difficulty::Hard)),
            KeyCode::Char('4') => return Ok(MenuResult::Start(Difficulty::Insane)),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let _ = game.toggle_sound();
                draw_menu(out, game)?;
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                let _ = game.toggle_effects();
                draw_menu(out, game)?;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(MenuResult::Quit);
            }
            _ => {}
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<bool> {
    let mut rng = thread_rng();
    let mut driver = Driver::new();
    let mut input = TerminalInput::default();
    let mut name = String::new();

    loop {
        let frame_start = Instant::now();
        input.frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(true);
            }

            if game.awaiting_name() {
                if kind == KeyEventKind::Release {
                    continue;
                }
                match code {
                    KeyCode::Enter => match game.submit_high_score(&name, unix_millis()) {
                        Ok(_) => name.clear(),
                        Err(err) => tracing::debug!(%err, "high score not recorded"),
                    },
                    KeyCode::Esc => {
                        game.skip_high_score();
                        name.clear();
                    }
                    KeyCode::Backspace => {
                        let _ = name.pop();
                    }
                    KeyCode::Char(c) if c.is_alphanumeric() && name.chars().count() < MAX_NAME_LEN => {
                        name.push(c.to_ascii_uppercase());
                    }
                    _ => {}
                }
                continue;
            }

            match kind {
                KeyEventKind::Press => {
                    let _ = input.key_frame.insert(code, input.frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            input.pause_requested = true;
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            if game.reset() {
                                return Ok(false);
                            }
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    let _ = input.key_frame.insert(code, input.frame);
                }
                KeyEventKind::Release => {
                    let _ = input.key_frame.remove(&code);
                }
            }
        }

        let _ = driver.frame(game, &mut input, Instant::now(), &mut rng);
        if game.status() != GameStatus::Playing {
            input.clear();
        }

        let (width, height) = terminal::size()?;
        let view = Viewport { width, height };
        if let Some(snap) = game.snapshot() {
            display::render(out, view, &snap, game.preferences().effects_enabled)?;
        }
        if let (GameStatus::GameOver, Some(run)) = (game.status(), game.last_run()) {
            let prompt = game.awaiting_name().then_some(name.as_str());
            display::draw_game_over(out, view, &run, prompt)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let dir = data_dir();
    init_logging(&dir);

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &dir);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, dir: &Path) -> std::io::Result<()> {
    let store = JsonFileStore::new(dir.join(SAVE_FILE));
    tracing::info!(path = %store.path().display(), "loading save file");
    let mut game = Game::new(Box::new(store), Box::new(LoggedScoreSink));

    loop {
        match show_menu(out, rx, &mut game)? {
            MenuResult::Quit => break,
            MenuResult::Start(difficulty) => {
                game.set_difficulty(difficulty);
                let _ = game.start();
                if game_loop(out, &mut game, rx)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
