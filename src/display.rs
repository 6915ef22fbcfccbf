//! Rendering layer.  All terminal output lives here.
//!
//! Each function receives a mutable writer and an immutable [`Snapshot`].
//! No game logic is performed; this module only maps the normalised 0–100
//! playfield onto terminal cells.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use wave_shooter::entities::{
    Difficulty, Enemy, EnemyKind, GameStatus, PowerUp, PowerUpKind, Projectile, ProjectileStyle,
    Snapshot,
};
use wave_shooter::game::FinishedRun;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_COMBO: Color = Color::Magenta;
const C_PLAYER: Color = Color::White;
const C_PLAYER_BLINK: Color = Color::DarkGrey;
const C_ENEMY_SCOUT: Color = Color::Green;
const C_ENEMY_FIGHTER: Color = Color::Yellow;
const C_ENEMY_BOMBER: Color = Color::Red;
const C_PROJECTILE: Color = Color::Cyan;
const C_DEFENSE_LINE: Color = Color::DarkRed;
const C_HINT: Color = Color::DarkGrey;

/// Terminal area and the playfield mapping inside its border.
#[derive(Clone, Copy)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    /// Playfield x (0–100) → column inside the side walls.
    fn col(&self, x: f32) -> u16 {
        let inner = self.width.saturating_sub(3) as f32;
        1 + (x.clamp(0.0, 100.0) / 100.0 * inner).round() as u16
    }

    /// Playfield y (0–100) → row between the top and bottom bars.
    fn row(&self, y: f32) -> Option<u16> {
        if !(0.0..=100.0).contains(&y) {
            return None;
        }
        let inner = self.height.saturating_sub(5) as f32;
        Some(2 + (y / 100.0 * inner).round() as u16)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    view: Viewport,
    snap: &Snapshot,
    effects_enabled: bool,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_defense_line(out, view)?;
    draw_hud(out, view, snap, effects_enabled)?;

    for enemy in &snap.enemies {
        draw_enemy(out, view, enemy)?;
    }
    for power_up in &snap.power_ups {
        draw_power_up(out, view, power_up)?;
    }
    for projectile in &snap.projectiles {
        draw_projectile(out, view, projectile)?;
    }

    draw_player(out, view, snap, effects_enabled)?;
    draw_controls_hint(out, view)?;

    if snap.status == GameStatus::Paused {
        draw_banner(out, view, &[("║      PAUSED        ║", Color::Cyan)])?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

fn draw_defense_line<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    let Some(row) = view.row(wave_shooter::config::DEFENSE_LINE_Y) else {
        return Ok(());
    };
    out.queue(cursor::MoveTo(1, row))?;
    out.queue(style::SetForegroundColor(C_DEFENSE_LINE))?;
    out.queue(Print("┄".repeat(view.width.saturating_sub(2) as usize)))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn difficulty_tag(difficulty: Difficulty) -> (&'static str, Color) {
    match difficulty {
        Difficulty::Easy => ("[ EASY ]", Color::Green),
        Difficulty::Normal => ("[ NORMAL ]", Color::Yellow),
        Difficulty::Hard => ("[ HARD ]", Color::Red),
        Difficulty::Insane => ("[ INSANE ]", Color::Magenta),
    }
}

fn power_up_symbol(kind: PowerUpKind) -> (&'static str, Color) {
    match kind {
        PowerUpKind::RapidFire => ("!", Color::Cyan),
        PowerUpKind::Shield => ("◈", Color::Blue),
        PowerUpKind::MultiShot => ("★", Color::Yellow),
        PowerUpKind::SlowMotion => ("◷", Color::Magenta),
    }
}

fn draw_hud<W: Write>(
    out: &mut W,
    view: Viewport,
    snap: &Snapshot,
    effects_enabled: bool,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>7}  Wave:{:>2}", snap.score, snap.wave)))?;

    if snap.combo > 0 {
        let combo_color = if effects_enabled && snap.multiplier > 1 {
            C_HUD_COMBO
        } else {
            C_HINT
        };
        out.queue(style::SetForegroundColor(combo_color))?;
        out.queue(Print(format!("  Combo:{} x{}", snap.combo, snap.multiplier)))?;
    }

    let (tag, tag_color) = difficulty_tag(snap.difficulty);
    let lx = (view.width / 2).saturating_sub(tag.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 1))?;
    out.queue(style::SetForegroundColor(tag_color))?;
    out.queue(Print(tag))?;

    // Active effects + lives, right-aligned
    let mut effect_tags = Vec::new();
    for effect in &snap.active_power_ups {
        let remaining = effect.expires_at.saturating_sub(snap.sim_ms) / 1000 + 1;
        let (sym, color) = power_up_symbol(effect.kind);
        effect_tags.push((format!("[{sym}{remaining:>2}s]"), color));
    }
    let lives_str = format!(" Lives:{}", "♥".repeat(snap.lives as usize));
    let total: usize = effect_tags
        .iter()
        .map(|(t, _)| t.chars().count())
        .sum::<usize>()
        + lives_str.chars().count();

    let rx = view.width.saturating_sub(total as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    for (tag, color) in &effect_tags {
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(tag))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(
    out: &mut W,
    view: Viewport,
    snap: &Snapshot,
    effects_enabled: bool,
) -> std::io::Result<()> {
    let p = &snap.player;
    let Some(row) = view.row(p.y) else {
        return Ok(());
    };
    let col = view.col(p.x);

    // Blink while invulnerable
    let blink = effects_enabled && p.invulnerable && (snap.sim_ms / 150) % 2 == 0;
    out.queue(style::SetForegroundColor(if blink { C_PLAYER_BLINK } else { C_PLAYER }))?;

    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("▲"))?;
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row + 1))?;
    out.queue(Print("/█\\"))?;
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, view: Viewport, enemy: &Enemy) -> std::io::Result<()> {
    let Some(row) = view.row(enemy.y) else {
        return Ok(());
    };
    let lx = view.col(enemy.x).saturating_sub(1).max(1);
    let (sprite, color) = match enemy.kind {
        EnemyKind::Scout => ("«▼»", C_ENEMY_SCOUT),
        EnemyKind::Fighter => ("(◎)", C_ENEMY_FIGHTER),
        EnemyKind::Bomber => ("[▓]", C_ENEMY_BOMBER),
    };
    out.queue(cursor::MoveTo(lx, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(sprite))?;
    Ok(())
}

fn draw_projectile<W: Write>(
    out: &mut W,
    view: Viewport,
    projectile: &Projectile,
) -> std::io::Result<()> {
    let Some(row) = view.row(projectile.y) else {
        return Ok(());
    };
    let glyph = match projectile.style {
        ProjectileStyle::Standard => "║",
        ProjectileStyle::Spread => "│",
    };
    out.queue(cursor::MoveTo(view.col(projectile.x), row))?;
    out.queue(style::SetForegroundColor(C_PROJECTILE))?;
    out.queue(Print(glyph))?;
    Ok(())
}

/// Falling power-up item.
///
/// Symbols:
///   !  (cyan)  RapidFire
///   ◈  (blue)  Shield
///   ★  (yellow)  MultiShot
///   ◷  (magenta)  SlowMotion
fn draw_power_up<W: Write>(out: &mut W, view: Viewport, power_up: &PowerUp) -> std::io::Result<()> {
    let Some(row) = view.row(power_up.y) else {
        return Ok(());
    };
    let (sym, color) = power_up_symbol(power_up.kind);
    out.queue(cursor::MoveTo(view.col(power_up.x), row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(sym))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   P : Pause   R : Reset   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    view: Viewport,
    middle: &[(&str, Color)],
) -> std::io::Result<()> {
    let top = "╔════════════════════╗";
    let bottom = "╚════════════════════╝";
    let cx = view.width / 2;
    let start_row = (view.height / 2).saturating_sub((middle.len() as u16 + 2) / 2);

    let mut lines: Vec<(&str, Color)> = vec![(top, middle.first().map_or(Color::White, |m| m.1))];
    lines.extend_from_slice(middle);
    lines.push((bottom, middle.first().map_or(Color::White, |m| m.1)));

    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

/// Results screen shown over the last frame.  `name_prompt` is the name
/// typed so far when the run qualified for the ledger.
pub fn draw_game_over<W: Write>(
    out: &mut W,
    view: Viewport,
    run: &FinishedRun,
    name_prompt: Option<&str>,
) -> std::io::Result<()> {
    draw_banner(out, view, &[("║    GAME  OVER      ║", Color::Red)])?;

    let cx = view.width / 2;
    let base = view.height / 2 + 2;
    let mut rows: Vec<(String, Color)> = vec![
        (format!("Final Score: {:>7}", run.score), Color::Yellow),
        (format!("Wave {}   Best combo {}", run.wave, run.peak_combo), Color::DarkGrey),
    ];
    match name_prompt {
        Some(name) => {
            rows.push(("★ NEW HIGH SCORE ★".to_string(), Color::Yellow));
            rows.push((format!("Name: {name}_"), Color::White));
            rows.push(("ENTER - Save   ESC - Skip".to_string(), Color::DarkGrey));
        }
        None => rows.push(("R - Menu  Q - Quit".to_string(), Color::White)),
    }

    for (i, (line, color)) in rows.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, base + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(line))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}
