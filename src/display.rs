/// Rendering layer: all terminal I/O for a round lives here.
///
/// Each function receives a mutable writer and an immutable render snapshot.
/// No game logic is performed; this module only translates the snapshot
/// into terminal commands.  One terminal cell covers `CELL_W × CELL_H`
/// world pixels.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;
use shadowed_forest::entities::{DropKind, EnemyKind, GameStatus, Skin};
use shadowed_forest::geometry::Rect;
use shadowed_forest::snapshot::{HudView, RenderSnapshot, SpriteKind, SpriteView};

pub const CELL_W: f32 = 16.0;
pub const CELL_H: f32 = 32.0;

/// Rows taken by the HUD (top) and the controls hint (bottom).
pub const HUD_ROWS: u16 = 1;
pub const HINT_ROWS: u16 = 1;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_LIGHT: Color = Color::Green;
const C_HUD_LIGHT_LOW: Color = Color::Red;
const C_OBSTACLE_LIT: Color = Color::DarkGreen;
const C_OBSTACLE_DARK: Color = Color::DarkGrey;
const C_GROUND: Color = Color::DarkYellow;
const C_PLAYER: Color = Color::White;
const C_GHOST: Color = Color::Cyan;
const C_BAT: Color = Color::Magenta;
const C_SKELETON: Color = Color::Grey;
const C_SILHOUETTE: Color = Color::White;
const C_BULLET: Color = Color::Yellow;
const C_DROP_HEALTH: Color = Color::Red;
const C_DROP_BATTERY: Color = Color::Green;
const C_HINT: Color = Color::DarkGrey;

/// Viewport in world pixels for a terminal of `cols × rows`.
pub fn viewport_for(cols: u16, rows: u16) -> Vec2 {
    let play_rows = rows.saturating_sub(HUD_ROWS + HINT_ROWS);
    Vec2::new(cols as f32 * CELL_W, play_rows as f32 * CELL_H)
}

/// Cell under a screen-space pixel position, if it is inside the play area.
fn to_cell(p: Vec2, cols: u16, rows: u16) -> Option<(u16, u16)> {
    if p.x < 0.0 || p.y < 0.0 {
        return None;
    }
    let col = (p.x / CELL_W) as u16;
    let row = (p.y / CELL_H) as u16 + HUD_ROWS;
    if col >= cols || row >= rows.saturating_sub(HINT_ROWS) {
        return None;
    }
    Some((col, row))
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    snap: &RenderSnapshot,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let center = snap.viewport / 2.0;
    let lit_at = |p: Vec2| {
        !snap.hud.fog_active
            || snap.hud.countdown_secs.is_some()
            || p.distance(center) <= snap.hud.light_radius
    };
    let lit = |s: &SpriteView| lit_at(s.rect.center());

    for sprite in snap.layers() {
        match sprite.kind {
            SpriteKind::Obstacle => {
                let (fill, color) = if lit(sprite) {
                    ("▓", C_OBSTACLE_LIT)
                } else {
                    ("░", C_OBSTACLE_DARK)
                };
                fill_area(out, &sprite.rect, fill, color, cols, rows, |_| true)?
            }
            // Floor outside the light stays black
            SpriteKind::Ground => {
                fill_area(out, &sprite.rect, "·", C_GROUND, cols, rows, &lit_at)?
            }
            SpriteKind::Player(_) => draw_sprite(out, sprite, cols, rows)?,
            _ if lit(sprite) => draw_sprite(out, sprite, cols, rows)?,
            _ => {}
        }
    }

    draw_hud(out, &snap.hud, cols)?;
    draw_controls_hint(out, rows)?;

    if let Some(secs) = snap.hud.countdown_secs {
        draw_banner(out, cols, rows, &[(format!("{}", secs.ceil() as u32), Color::Yellow)])?;
    }
    match snap.hud.status {
        GameStatus::Paused => draw_banner(
            out,
            cols,
            rows,
            &[
                ("║  PAUSED  ║".to_string(), Color::White),
                ("P - Resume  R - Restart  Q - Quit".to_string(), Color::DarkGrey),
            ],
        )?,
        GameStatus::GameOver => draw_game_over(out, &snap.hud, cols, rows)?,
        GameStatus::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn bar(ratio: f32, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn draw_hud<W: Write>(out: &mut W, hud: &HudView, cols: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(format!("HP {} ", bar(hud.health_ratio, 10))))?;

    let light_color = if hud.light_charge_ratio > 0.2 {
        C_HUD_LIGHT
    } else {
        C_HUD_LIGHT_LOW
    };
    out.queue(style::SetForegroundColor(light_color))?;
    out.queue(Print(format!("Light {} ", bar(hud.light_charge_ratio, 10))))?;

    let right = format!(
        "Score:{:>6}  Lv:{}  Kills:{}",
        hud.score, hud.difficulty, hud.kills
    );
    let rx = cols.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(right))?;
    Ok(())
}

// ── Sprites ───────────────────────────────────────────────────────────────────

fn fill_area<W: Write>(
    out: &mut W,
    r: &Rect,
    fill: &str,
    color: Color,
    cols: u16,
    rows: u16,
    visible: impl Fn(Vec2) -> bool,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(color))?;
    let mut y = r.top().max(0.0);
    while y < r.bottom() {
        let mut x = r.left().max(0.0);
        while x < r.right() {
            let p = Vec2::new(x, y);
            if let Some((col, row)) = to_cell(p, cols, rows).filter(|_| visible(p)) {
                out.queue(cursor::MoveTo(col, row))?;
                out.queue(Print(fill))?;
            }
            x += CELL_W;
        }
        y += CELL_H;
    }
    Ok(())
}

fn glyph(kind: SpriteKind) -> (&'static str, Color) {
    match kind {
        SpriteKind::Player(Skin::Veronica) => ("@", C_PLAYER),
        SpriteKind::Player(Skin::Santiago) => ("&", C_PLAYER),
        SpriteKind::Enemy(EnemyKind::Ghost) => ("G", C_GHOST),
        SpriteKind::Enemy(EnemyKind::Bat) => ("w", C_BAT),
        SpriteKind::Enemy(EnemyKind::Skeleton) => ("S", C_SKELETON),
        SpriteKind::Bullet => ("•", C_BULLET),
        SpriteKind::Drop(DropKind::Health) => ("♥", C_DROP_HEALTH),
        SpriteKind::Drop(DropKind::Battery) => ("▮", C_DROP_BATTERY),
        SpriteKind::Obstacle => ("▓", C_OBSTACLE_LIT),
        SpriteKind::Ground => ("·", C_GROUND),
    }
}

fn draw_sprite<W: Write>(
    out: &mut W,
    sprite: &SpriteView,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let Some((col, row)) = to_cell(sprite.rect.center(), cols, rows) else {
        return Ok(());
    };
    let (symbol, color) = glyph(sprite.kind);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(if sprite.silhouette {
        C_SILHOUETTE
    } else {
        color
    }))?;
    out.queue(Print(if sprite.silhouette { "✕" } else { symbol }))?;

    // Health bar one row above a damaged enemy
    if let Some(ratio) = sprite.health_bar {
        if ratio < 1.0 && row > HUD_ROWS {
            out.queue(cursor::MoveTo(col.saturating_sub(1), row - 1))?;
            out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
            out.queue(Print(bar(ratio, 3)))?;
        }
    }
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    cols: u16,
    rows: u16,
    lines: &[(String, Color)],
) -> std::io::Result<()> {
    let cx = cols / 2;
    let start_row = (rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

fn draw_game_over<W: Write>(
    out: &mut W,
    hud: &HudView,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let lines = [
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (format!("Final Score: {:>6}", hud.score), Color::Yellow),
        (format!("Enemies defeated: {}", hud.kills), Color::DarkGrey),
        ("R - Play Again  Q - Menu".to_string(), Color::White),
    ];
    draw_banner(out, cols, rows, &lines)
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "WASD/←→↑↓ : Move   Mouse/IJKL : Aim   Click/SPACE : Shoot   P : Pause   Q : Quit",
    ))?;
    Ok(())
}
