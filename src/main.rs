mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shadowed_forest::compute::{init_state, reset, tick, toggle_pause};
use shadowed_forest::config::GameConfig;
use shadowed_forest::entities::{GameStatus, Skin, World};
use shadowed_forest::events::FrameEvent;
use shadowed_forest::input::InputSnapshot;
use shadowed_forest::map::MapLayout;
use shadowed_forest::scores::{HighScores, ScoreEntry};
use shadowed_forest::snapshot;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest step fed to the simulation; a stalled terminal must not teleport
/// enemies through walls.
const MAX_DT: f32 = 0.1;

const CONFIG_FILE: &str = "shadowed_forest.toml";
const MAP_FILE: &str = "map.toml";
const LOG_FILE: &str = "shadowed_forest.log";

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── High-score persistence ────────────────────────────────────────────────────

fn high_score_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".shadowed_forest_scores.json")
}

fn record_score(scores: &mut HighScores, name: &str, score: u32) {
    if scores.submit(ScoreEntry::today(name, score)) {
        info!(name, score, "new high-score entry");
    }
    if let Err(e) = scores.save(high_score_path()) {
        warn!(error = %e, "could not save high scores");
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log to a file: the terminal is in raw mode and owned by the renderer.
fn init_tracing() {
    let Ok(file) = File::create(LOG_FILE) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start { name: String, skin: Skin },
    Quit,
}

fn centered<W: Write>(
    out: &mut W,
    row: u16,
    cx: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(
        cx.saturating_sub(text.chars().count() as u16 / 2),
        row,
    ))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn next_key(rx: &mpsc::Receiver<Event>) -> Option<KeyCode> {
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind, .. })) if kind != KeyEventKind::Release => {
                return Some(code)
            }
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

const MENU_OPTIONS: [&str; 4] = ["Play", "Scores", "Help", "Quit"];

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    scores: &HighScores,
) -> std::io::Result<MenuResult> {
    let options = MENU_OPTIONS;
    let mut selected = 0usize;

    loop {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        let (width, height) = terminal::size()?;
        let cx = width / 2;
        let cy = height / 2;

        centered(out, cy.saturating_sub(6), cx, "☾  SHADOWED  FOREST  ☾", Color::Cyan)?;
        if scores.best() > 0 {
            let best = format!("Best Score: {}", scores.best());
            centered(out, cy.saturating_sub(5), cx, &best, Color::Yellow)?;
        }
        for (i, label) in options.iter().enumerate() {
            let (text, color) = if i == selected {
                (format!("▶ {}", label), Color::Yellow)
            } else {
                (format!("  {}", label), Color::White)
            };
            centered(out, cy.saturating_sub(2) + i as u16, cx, &text, color)?;
        }
        centered(out, cy + 3, cx, "↑ ↓ / W S : Select   ENTER : Confirm", Color::DarkGrey)?;
        out.queue(style::ResetColor)?;
        out.flush()?;

        match next_key(rx) {
            None => return Ok(MenuResult::Quit),
            Some(KeyCode::Up) | Some(KeyCode::Char('w')) => {
                selected = (selected + options.len() - 1) % options.len();
            }
            Some(KeyCode::Down) | Some(KeyCode::Char('s')) => {
                selected = (selected + 1) % options.len();
            }
            Some(KeyCode::Enter) => match options[selected] {
                "Play" => {
                    if let Some(name) = prompt_name(out, rx)? {
                        if let Some(skin) = choose_skin(out, rx)? {
                            return Ok(MenuResult::Start { name, skin });
                        }
                    }
                }
                "Scores" => show_scores(out, rx, scores)?,
                "Help" => show_help(out, rx)?,
                _ => return Ok(MenuResult::Quit),
            },
            Some(KeyCode::Char('q')) | Some(KeyCode::Esc) => return Ok(MenuResult::Quit),
            Some(_) => {}
        }
    }
}

/// Up to 10 printable characters.  `None` when the player backs out.
fn prompt_name<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<Option<String>> {
    let mut name = String::new();
    loop {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        let (width, height) = terminal::size()?;
        let (cx, cy) = (width / 2, height / 2);
        centered(out, cy.saturating_sub(1), cx, "Enter your name:", Color::White)?;
        centered(out, cy + 1, cx, &format!("{}_", name), Color::Yellow)?;
        out.flush()?;

        match next_key(rx) {
            None | Some(KeyCode::Esc) => return Ok(None),
            Some(KeyCode::Enter) if !name.trim().is_empty() => {
                return Ok(Some(name.trim().to_string()))
            }
            Some(KeyCode::Backspace) => {
                name.pop();
            }
            Some(KeyCode::Char(c)) if name.chars().count() < 10 && !c.is_control() => {
                name.push(c)
            }
            Some(_) => {}
        }
    }
}

fn choose_skin<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<Option<Skin>> {
    let skins = [(Skin::Veronica, "Veronica  @"), (Skin::Santiago, "Santiago  &")];
    let mut selected = 0usize;
    loop {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        let (width, height) = terminal::size()?;
        let (cx, cy) = (width / 2, height / 2);
        centered(out, cy.saturating_sub(2), cx, "Choose your character:", Color::White)?;
        for (i, (_, label)) in skins.iter().enumerate() {
            let color = if i == selected { Color::Yellow } else { Color::DarkGrey };
            centered(out, cy + i as u16, cx, label, color)?;
        }
        out.flush()?;

        match next_key(rx) {
            None | Some(KeyCode::Esc) => return Ok(None),
            Some(KeyCode::Left) | Some(KeyCode::Char('a')) | Some(KeyCode::Up) => {
                selected = (selected + skins.len() - 1) % skins.len();
            }
            Some(KeyCode::Right) | Some(KeyCode::Char('d')) | Some(KeyCode::Down) => {
                selected = (selected + 1) % skins.len();
            }
            Some(KeyCode::Enter) => return Ok(Some(skins[selected].0)),
            Some(_) => {}
        }
    }
}

fn show_scores<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    scores: &HighScores,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    let (cx, cy) = (width / 2, height / 2);
    centered(out, cy.saturating_sub(4), cx, "HIGH SCORES", Color::Cyan)?;
    if scores.entries.is_empty() {
        centered(out, cy.saturating_sub(2), cx, "No scores yet", Color::DarkGrey)?;
    }
    for (i, e) in scores.entries.iter().enumerate() {
        let line = format!("{}. {:<10} {:>7}  ({})", i + 1, e.name, e.score, e.date);
        centered(out, cy.saturating_sub(2) + i as u16, cx, &line, Color::White)?;
    }
    centered(out, cy + 5, cx, "ESC : Back", Color::DarkGrey)?;
    out.flush()?;
    while let Some(code) = next_key(rx) {
        if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            break;
        }
    }
    Ok(())
}

const HELP_LINES: [&str; 9] = [
    "W A S D / Arrows : Move",
    "I J K L / Mouse  : Aim",
    "SPACE / Click    : Fire",
    "P : Pause   R : Restart after game over",
    "",
    "Your light fades over time. Pick up ▮ to recharge it.",
    "With the light out you move at half speed.",
    "Pick up ♥ to heal. Enemies toughen every few seconds.",
    "Survive as long as you can.",
];

fn show_help<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    let (cx, cy) = (width / 2, height / 2);
    centered(out, cy.saturating_sub(7), cx, "HOW TO PLAY", Color::Cyan)?;
    for (i, line) in HELP_LINES.iter().enumerate() {
        centered(out, cy.saturating_sub(5) + i as u16, cx, line, Color::White)?;
    }
    centered(out, cy + 6, cx, "ESC : Back", Color::DarkGrey)?;
    out.flush()?;
    while let Some(code) = next_key(rx) {
        if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            break;
        }
    }
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Input model: a `key_frame` map records the frame of the last press/repeat
/// event for every key; each frame the still-fresh keys are folded into one
/// `InputSnapshot`, so movement, aiming and firing combine freely.  Mouse
/// position sets the aim, the left button fires while held.
fn game_loop<W: Write>(
    out: &mut W,
    world: &mut World,
    rx: &mpsc::Receiver<Event>,
    scores: &mut HighScores,
) -> std::io::Result<bool> {
    let mut rng = StdRng::from_entropy();

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut mouse_down = false;
    let mut pointer: Option<(u16, u16)> = None;
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let (cols, rows) = terminal::size()?;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code.clone(), frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(false);
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(true);
                            }
                            KeyCode::Char('p') | KeyCode::Char('P') => toggle_pause(world),
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if world.status != GameStatus::Playing =>
                            {
                                reset(world);
                            }
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code.clone(), frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(m) => {
                    pointer = Some((m.column, m.row));
                    match m.kind {
                        MouseEventKind::Down(MouseButton::Left)
                        | MouseEventKind::Drag(MouseButton::Left) => mouse_down = true,
                        MouseEventKind::Up(MouseButton::Left) => mouse_down = false,
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // ── Build the input snapshot ──────────────────────────────────────────
        let held = |keys: &[KeyCode]| any_held(&key_frame, keys, frame);
        let mut input = InputSnapshot {
            up: held(&[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')]),
            down: held(&[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')]),
            left: held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
            right: held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
            fire: mouse_down || held(&[KeyCode::Char(' ')]),
            aim: Vec2::ZERO,
        };
        let key_aim = Vec2::new(
            held(&[KeyCode::Char('l')]) as i32 as f32 - held(&[KeyCode::Char('j')]) as i32 as f32,
            held(&[KeyCode::Char('k')]) as i32 as f32 - held(&[KeyCode::Char('i')]) as i32 as f32,
        );
        if key_aim != Vec2::ZERO {
            input.aim = key_aim;
        } else if let Some((col, row)) = pointer {
            let viewport = display::viewport_for(cols, rows);
            let px = Vec2::new(
                col as f32 * display::CELL_W + display::CELL_W / 2.0,
                (row.saturating_sub(display::HUD_ROWS)) as f32 * display::CELL_H
                    + display::CELL_H / 2.0,
            );
            input.aim = px - viewport / 2.0;
        }

        // ── Simulate ──────────────────────────────────────────────────────────
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_DT);
        last = now;

        for ev in tick(world, &input, dt, &mut rng) {
            match ev {
                FrameEvent::BulletHit { .. } => {
                    out.queue(Print("\x07"))?;
                }
                FrameEvent::GameOver { score } => {
                    let name = world.player_name.clone();
                    record_score(scores, &name, score);
                }
                _ => {}
            }
        }

        let snap = snapshot::build(world, display::viewport_for(cols, rows));
        display::render(out, &snap, cols, rows)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn load_map() -> MapLayout {
    if !Path::new(MAP_FILE).exists() {
        return MapLayout::built_in();
    }
    match MapLayout::load(MAP_FILE) {
        Ok(map) => {
            info!(path = MAP_FILE, "loaded map");
            map
        }
        Err(e) => {
            warn!(path = MAP_FILE, error = %e, "map rejected, using built-in map");
            MapLayout::built_in()
        }
    }
}

fn main() -> std::io::Result<()> {
    init_tracing();

    let config = match GameConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "config rejected");
            eprintln!("{CONFIG_FILE}: {e}");
            std::process::exit(1);
        }
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

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

    let result = run(&mut out, &rx, config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: GameConfig,
) -> std::io::Result<()> {
    let mut scores = HighScores::load(high_score_path());

    loop {
        match show_menu(out, rx, &scores)? {
            MenuResult::Quit => break,
            MenuResult::Start { name, skin } => {
                let mut world = match init_state(config.clone(), load_map(), name, skin) {
                    Ok(world) => world,
                    Err(e) => {
                        // The round cannot start; the process keeps running.
                        error!(error = %e, "round setup failed");
                        continue;
                    }
                };
                if game_loop(out, &mut world, rx, &mut scores)? {
                    break;
                }
            }
        }
    }
    Ok(())
}
