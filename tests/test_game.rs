use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use wave_shooter::compute::StepOutcome;
use wave_shooter::entities::*;
use wave_shooter::error::LedgerError;
use wave_shooter::game::*;
use wave_shooter::scoring::points_for;
use wave_shooter::store::{MemoryStore, RecordStore};
use wave_shooter::wave::wave_dimensions;

/// Score sink that remembers every report.
#[derive(Clone, Default)]
struct RecordingSink(Rc<RefCell<Vec<u64>>>);

impl ScoreSink for RecordingSink {
    fn report_bonus(&mut self, units: u64) {
        self.0.borrow_mut().push(units);
    }
}

fn new_game() -> (Game, MemoryStore, RecordingSink) {
    let store = MemoryStore::new();
    let sink = RecordingSink::default();
    let game = Game::new(Box::new(store.clone()), Box::new(sink.clone()));
    (game, store, sink)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

const IDLE: HeldKeys = HeldKeys { left: false, right: false, fire: false };

/// Step with no input until the player has `lives` left.
fn step_until_lives(game: &mut Game, rng: &mut StdRng, lives: u32) {
    for _ in 0..20_000 {
        if game.session().map(|s| s.player.lives) == Some(lives) {
            return;
        }
        let _ = game.step(1.0, IDLE, rng);
    }
    panic!("player never dropped to {lives} lives");
}

/// One autopilot step: chase the lowest enemy not in `spared` with the
/// trigger held, and idle once nothing is left to chase.
fn chase_lowest(game: &mut Game, rng: &mut StdRng, spared: &[u64]) -> Option<StepOutcome> {
    let s = game.session()?;
    let target = s
        .enemies
        .iter()
        .filter(|e| !spared.contains(&e.id))
        .max_by(|a, b| a.y.total_cmp(&b.y));
    let keys = match target {
        Some(target) => {
            let dx = target.x - s.player.x;
            HeldKeys {
                left: dx <= -1.0,
                right: dx >= 1.0,
                fire: true,
            }
        }
        None => IDLE,
    };
    game.step(1.0, keys, rng)
}

/// Score for kills landing in this order on top of `streak`.
fn kill_value(points: impl Iterator<Item = u32>, streak: u32) -> u64 {
    points
        .enumerate()
        .map(|(i, p)| points_for(p, streak + i as u32))
        .sum()
}

/// Easy run where the right-hand column (ids 3 and 7) is left alone, so
/// exactly one enemy reaches the line first.  Returns once a life is gone.
fn start_single_breach_run(game: &mut Game, rng: &mut StdRng) {
    game.set_difficulty(Difficulty::Easy);
    let _ = game.start();
    for _ in 0..5_000 {
        if game.session().map(|s| s.player.lives) == Some(2) {
            return;
        }
        let _ = chase_lowest(game, rng, &[3, 7]);
    }
    panic!("no breach happened");
}

// ── Transitions ───────────────────────────────────────────────────────────────

#[test]
fn new_game_is_idle_and_inert() {
    let (mut game, _, _) = new_game();
    assert_eq!(game.status(), GameStatus::Idle);
    assert!(game.session().is_none());
    assert!(game.snapshot().is_none());
    assert_eq!(game.step(1.0, IDLE, &mut seeded_rng()), None);
    assert!(!game.pause());
    assert!(!game.resume());
    assert!(!game.reset());
}

#[test]
fn start_spawns_first_wave_and_counts_game() {
    let (mut game, store, _) = new_game();
    assert!(game.start());
    assert_eq!(game.status(), GameStatus::Playing);

    let snap = game.snapshot().unwrap();
    assert_eq!(snap.wave, 1);
    assert_eq!(snap.enemies.len(), 8);
    assert!(snap.enemies.iter().all(|e| e.health == 1));
    assert_eq!(snap.lives, 3);
    assert_eq!(snap.score, 0);
    assert_eq!(game.stats().games_played, 1);
    assert_eq!(store.load().total_games_played, 1);

    // only from idle
    assert!(!game.start());
}

#[test]
fn pause_freezes_simulation() {
    let (mut game, _, _) = new_game();
    let mut rng = seeded_rng();
    let _ = game.start();
    let _ = game.step(1.0, IDLE, &mut rng);

    assert!(game.pause());
    assert_eq!(game.status(), GameStatus::Paused);
    let frozen = game.session().cloned();
    for _ in 0..100 {
        assert_eq!(game.step(1.0, IDLE, &mut rng), None);
    }
    assert_eq!(game.session().cloned(), frozen);

    assert!(game.resume());
    assert_eq!(game.status(), GameStatus::Playing);
    assert!(game.step(1.0, IDLE, &mut rng).is_some());
}

#[test]
fn pause_then_resume_is_idempotent() {
    let keys = HeldKeys { left: true, right: false, fire: true };
    let (mut plain, _, _) = new_game();
    let (mut paused, _, _) = new_game();
    let mut rng_a = seeded_rng();
    let mut rng_b = seeded_rng();
    let _ = plain.start();
    let _ = paused.start();

    for i in 0..120 {
        if i == 60 {
            assert!(paused.pause());
            assert!(paused.resume());
        }
        let _ = plain.step(1.0, keys, &mut rng_a);
        let _ = paused.step(1.0, keys, &mut rng_b);
    }
    assert_eq!(plain.snapshot(), paused.snapshot());
}

#[test]
fn reset_from_pause_abandons_run_unrecorded() {
    let (mut game, store, sink) = new_game();
    let _ = game.start();
    let _ = game.step(1.0, IDLE, &mut seeded_rng());
    assert!(!game.reset()); // not while playing

    assert!(game.pause());
    assert!(game.reset());
    assert_eq!(game.status(), GameStatus::Idle);
    assert!(game.session().is_none());
    assert!(game.last_run().is_none());
    assert!(sink.0.borrow().is_empty());
    assert!(store.load().high_scores.is_empty());
    assert_eq!(
        game.submit_high_score("ace", 0),
        Err(LedgerError::NotEligible)
    );
}

// ── Invulnerability timer ─────────────────────────────────────────────────────

#[test]
fn invulnerability_clears_after_two_seconds() {
    let (mut game, _, _) = new_game();
    let mut rng = seeded_rng();
    start_single_breach_run(&mut game, &mut rng);

    let hit_at = game.session().unwrap().sim_ms;
    assert!(game.session().unwrap().player.invulnerable);
    assert_eq!(game.pending_tasks(), 1);

    loop {
        let _ = game.step(1.0, IDLE, &mut rng);
        let s = game.session().unwrap();
        if s.sim_ms < hit_at + 2_000 {
            assert!(s.player.invulnerable, "cleared early at {}", s.sim_ms);
        } else {
            assert!(!s.player.invulnerable);
            break;
        }
    }
    assert_eq!(game.pending_tasks(), 0);
    assert_eq!(game.session().unwrap().player.lives, 2);
}

#[test]
fn pending_timer_does_not_leak_into_next_run() {
    let (mut game, _, _) = new_game();
    let mut rng = seeded_rng();
    start_single_breach_run(&mut game, &mut rng);
    assert_eq!(game.pending_tasks(), 1);
    let first_session = game.session_id();

    assert!(game.pause());
    assert!(game.reset());
    assert_eq!(game.pending_tasks(), 0);

    assert!(game.start());
    assert_ne!(game.session_id(), first_session);
    let s = game.session().unwrap();
    assert!(!s.player.invulnerable);
    assert_eq!(s.player.lives, 3);
}

// ── End-to-end ────────────────────────────────────────────────────────────────

#[test]
fn clearing_wave_one_advances_to_wave_two() {
    let (mut game, _, _) = new_game();
    let mut rng = seeded_rng();
    assert_eq!(game.preferences().difficulty, Difficulty::Normal);
    let _ = game.start();

    // Score every step against the enemies that disappeared in it.
    let mut streak = 0u32;
    let mut cleared = false;
    for _ in 0..5_000 {
        let s = game.session().unwrap();
        if s.enemies.is_empty() {
            cleared = true;
            break;
        }
        let before: Vec<(u64, u32)> = s.enemies.iter().map(|e| (e.id, e.points)).collect();
        let score_before = s.score;

        let _ = chase_lowest(&mut game, &mut rng, &[]);

        let s = game.session().unwrap();
        let mut killed: Vec<u32> = before
            .iter()
            .filter(|(id, _)| s.enemies.iter().all(|e| e.id != *id))
            .map(|&(_, points)| points)
            .collect();
        killed.sort_unstable();
        let least = kill_value(killed.iter().rev().copied(), streak);
        let most = kill_value(killed.iter().copied(), streak);
        let gained = s.score - score_before;
        assert!(
            (least..=most).contains(&gained),
            "gained {gained} for kills {killed:?} at streak {streak}"
        );
        streak += killed.len() as u32;
    }
    assert!(cleared, "wave 1 was never cleared");

    let s = game.session().unwrap();
    assert_eq!(s.wave, 1);
    assert_eq!(s.kills, 8);
    assert_eq!(s.combo.streak, 8);
    assert_eq!(s.combo.multiplier(), 2);
    assert_eq!(s.player.lives, 3);
    // 120 base points; the sixth to eighth kills count double
    assert!((150..=180).contains(&s.score), "score {}", s.score);
    assert_eq!(game.stats().enemies_defeated, 8);

    let outcome = game.step(1.0, IDLE, &mut rng).unwrap();
    assert_eq!(outcome.wave_spawned, Some(2));
    assert_eq!(wave_dimensions(2), (2, 5));
    let s = game.session().unwrap();
    assert_eq!(s.wave, 2);
    assert_eq!(s.enemies.len() + outcome.kills as usize, 10);
    assert_eq!(game.stats().best_wave, 2);
}

#[test]
fn row_breach_ends_the_game_and_offers_ledger_entry() {
    let (mut game, store, sink) = new_game();
    let mut rng = seeded_rng();
    game.set_difficulty(Difficulty::Insane);
    let _ = game.start();

    // The lower row reaches the line together: four hits for three lives.
    step_until_lives(&mut game, &mut rng, 0);
    assert_eq!(game.status(), GameStatus::GameOver);
    assert_eq!(game.pending_tasks(), 0);

    // no further ticks
    assert_eq!(game.step(1.0, IDLE, &mut rng), None);

    let run = game.last_run().unwrap();
    assert_eq!(run.score, 0);
    assert_eq!(run.wave, 1);
    assert_eq!(game.stats().best_wave, 1);
    assert_eq!(game.session().unwrap().enemies.len(), 4);
    assert_eq!(*sink.0.borrow(), vec![run.score / 10]);

    // empty ledger: any score qualifies
    assert!(game.awaiting_name());
    assert_eq!(game.submit_high_score("  ", 5), Err(LedgerError::EmptyName));
    assert!(game.awaiting_name());
    assert!(game.ledger().is_empty());

    assert_eq!(game.submit_high_score("ace", 5), Ok(0));
    assert!(!game.awaiting_name());
    assert_eq!(game.ledger().entries()[0].name, "ACE");
    assert_eq!(game.ledger().entries()[0].wave, run.wave);
    assert_eq!(game.submit_high_score("again", 6), Err(LedgerError::NotEligible));

    let saved = store.load();
    assert_eq!(saved.high_scores.len(), 1);
    assert_eq!(saved.total_games_played, 1);
    assert_eq!(saved.best_wave, run.wave);

    // gameOver → idle; the bonus is never reported twice
    assert!(game.reset());
    assert_eq!(game.status(), GameStatus::Idle);
    assert_eq!(sink.0.borrow().len(), 1);
}

#[test]
fn full_ledger_rejects_low_score() {
    let mut seed = wave_shooter::ledger::Ledger::new();
    for i in 0..10 {
        let _ = seed.record("pro", 1_000 + i, 9, 0).unwrap();
    }
    let mut store = MemoryStore::new();
    store
        .save(&wave_shooter::store::PersistedRecord::from_parts(
            &seed,
            LifetimeStats::default(),
            Preferences {
                difficulty: Difficulty::Insane,
                ..Preferences::default()
            },
        ))
        .unwrap();

    let mut game = Game::new(Box::new(store), Box::new(NullScoreSink));
    assert_eq!(game.preferences().difficulty, Difficulty::Insane);
    let _ = game.start();
    step_until_lives(&mut game, &mut seeded_rng(), 0);

    assert_eq!(game.status(), GameStatus::GameOver);
    assert!(!game.awaiting_name());
    assert_eq!(game.submit_high_score("me", 0), Err(LedgerError::NotEligible));
    assert_eq!(game.ledger().len(), 10);
}

// ── Preferences ───────────────────────────────────────────────────────────────

#[test]
fn preferences_persist_across_instances() {
    let (mut game, store, _) = new_game();
    assert!(!game.toggle_sound());
    assert!(!game.toggle_effects());
    game.set_difficulty(Difficulty::Hard);

    let reloaded = Game::new(Box::new(store.clone()), Box::new(NullScoreSink));
    let prefs = reloaded.preferences();
    assert!(!prefs.sound_enabled);
    assert!(!prefs.effects_enabled);
    assert_eq!(prefs.difficulty, Difficulty::Hard);
}

#[test]
fn difficulty_applies_to_next_run() {
    let (mut game, _, _) = new_game();
    let _ = game.start();
    game.set_difficulty(Difficulty::Easy);
    assert_eq!(game.snapshot().unwrap().difficulty, Difficulty::Normal);

    let _ = game.pause();
    let _ = game.reset();
    let _ = game.start();
    assert_eq!(game.snapshot().unwrap().difficulty, Difficulty::Easy);
}

#[test]
fn saved_record_never_contains_run_state() {
    let (mut game, store, _) = new_game();
    let _ = game.start();
    for _ in 0..30 {
        let _ = game.step(1.0, HeldKeys { left: false, right: false, fire: true }, &mut seeded_rng());
    }
    let _ = game.toggle_sound();
    let text = store.contents().unwrap();
    assert!(!text.contains("enemies"));
    assert!(!text.contains("projectiles"));
    assert!(!text.contains("player"));
    assert!(!text.contains("simMs"));
}
