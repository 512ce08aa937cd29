//! Startup splash: drifting particle field with a fake loading bar.
//!
//! Runs on the alternate screen in raw mode, so it must finish before the
//! readline prompt takes over the terminal. Any key skips it; mouse movement
//! pushes nearby particles away.

use std::io::{Write, stdout};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind, MouseEventKind};
use crossterm::style::Stylize;
use crossterm::{cursor, execute, queue, terminal};

use davood_core::visual::particles::ParticleField;
use davood_core::visual::splash::LoadingProgress;

/// Canvas units per terminal cell.
const CELL_WIDTH: f64 = 8.0;
const CELL_HEIGHT: f64 = 16.0;

const FRAME_INTERVAL: Duration = Duration::from_millis(50);
const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);
const FINISH_HOLD: Duration = Duration::from_millis(500);

/// Only links at least this strong are drawn.
const VISIBLE_LINK: f64 = 0.04;

/// Restores the terminal however the splash ends.
struct ScreenGuard;

impl ScreenGuard {
    fn enter() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(guard)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Show the splash until loading completes or a key is pressed.
///
/// Blocking; call it from `spawn_blocking`.
pub fn run_splash(particles: bool) -> std::io::Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let _guard = ScreenGuard::enter()?;

    let mut rng = rand::thread_rng();
    let mut field = ParticleField::new(
        &mut rng,
        f64::from(cols) * CELL_WIDTH,
        f64::from(rows) * CELL_HEIGHT,
    );
    let mut progress = LoadingProgress::new();

    let mut last_tick = Instant::now();
    let mut completed_at: Option<Instant> = None;

    loop {
        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => break,
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Moved => {
                    field.repel(
                        f64::from(mouse.column) * CELL_WIDTH,
                        f64::from(mouse.row) * CELL_HEIGHT,
                    );
                }
                Event::Resize(c, r) => {
                    cols = c;
                    rows = r;
                    field.resize(f64::from(c) * CELL_WIDTH, f64::from(r) * CELL_HEIGHT);
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= PROGRESS_INTERVAL && !progress.is_complete() {
            progress.tick(&mut rng);
            last_tick = Instant::now();
            if progress.is_complete() {
                completed_at = Some(Instant::now());
            }
        }
        if completed_at.is_some_and(|at| at.elapsed() >= FINISH_HOLD) {
            break;
        }

        if particles {
            field.step();
        }
        draw(&field, &progress, particles, cols, rows)?;
    }
    Ok(())
}

fn draw(
    field: &ParticleField,
    progress: &LoadingProgress,
    particles: bool,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let mut out = stdout();
    queue!(out, terminal::Clear(terminal::ClearType::All))?;

    if particles {
        for (row, line) in render_field(field, usize::from(cols), usize::from(rows))
            .iter()
            .enumerate()
        {
            queue!(out, cursor::MoveTo(0, row as u16))?;
            write!(out, "{}", line.as_str().dark_cyan())?;
        }
    }

    let middle = rows / 2;
    let title = "DavoodAI";
    queue!(
        out,
        cursor::MoveTo(cols.saturating_sub(title.len() as u16) / 2, middle.saturating_sub(2))
    )?;
    write!(out, "{}", title.cyan().bold())?;

    let bar_width = usize::from(cols).saturating_sub(20).clamp(10, 50);
    let bar = progress_line(progress, bar_width);
    queue!(
        out,
        cursor::MoveTo(
            cols.saturating_sub(bar.chars().count() as u16) / 2,
            middle
        )
    )?;
    write!(out, "{bar}")?;

    let text = progress.text().unwrap_or_default();
    queue!(
        out,
        cursor::MoveTo(cols.saturating_sub(text.len() as u16) / 2, middle + 1)
    )?;
    write!(out, "{}", text.dim())?;

    out.flush()
}

/// Plot particles and strong links onto a `cols` x `rows` character grid.
pub fn render_field(field: &ParticleField, cols: usize, rows: usize) -> Vec<String> {
    let mut grid = vec![vec![' '; cols]; rows];
    let cell = |x: f64, y: f64| -> Option<(usize, usize)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (c, r) = ((x / CELL_WIDTH) as usize, (y / CELL_HEIGHT) as usize);
        (c < cols && r < rows).then_some((c, r))
    };

    let points = field.particles();
    for link in field.links() {
        if link.strength < VISIBLE_LINK {
            continue;
        }
        let (a, b) = (&points[link.a], &points[link.b]);
        if let Some((c, r)) = cell((a.x + b.x) / 2.0, (a.y + b.y) / 2.0) {
            grid[r][c] = '·';
        }
    }
    for p in points {
        if let Some((c, r)) = cell(p.x, p.y) {
            grid[r][c] = match p.size {
                s if s < 1.7 => '∙',
                s if s < 2.4 => '•',
                _ => '●',
            };
        }
    }

    grid.into_iter().map(|row| row.into_iter().collect()).collect()
}

/// `[#####-----]  42%` with `width` cells inside the brackets.
pub fn progress_line(progress: &LoadingProgress, width: usize) -> String {
    let filled = ((progress.percent() / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        progress.percent()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use davood_core::visual::particles::Particle;

    fn particle(x: f64, y: f64, size: f64) -> Particle {
        Particle {
            x,
            y,
            size,
            vx: 0.0,
            vy: 0.0,
            opacity: 0.5,
        }
    }

    #[test]
    fn test_render_field_places_particles_in_cells() {
        let field = ParticleField::from_particles(
            80.0,
            48.0,
            vec![particle(4.0, 4.0, 1.0), particle(75.0, 40.0, 2.8)],
        );
        let lines = render_field(&field, 10, 3);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].chars().next(), Some('∙'));
        assert_eq!(lines[2].chars().nth(9), Some('●'));
    }

    #[test]
    fn test_render_field_draws_strong_links() {
        let field = ParticleField::from_particles(
            160.0,
            32.0,
            vec![particle(0.0, 0.0, 1.0), particle(32.0, 0.0, 1.0)],
        );
        let lines = render_field(&field, 20, 2);
        assert_eq!(lines[0].chars().nth(2), Some('·'));
    }

    #[test]
    fn test_render_field_ignores_out_of_bounds() {
        let field = ParticleField::from_particles(10.0, 10.0, vec![particle(500.0, 500.0, 1.0)]);
        let lines = render_field(&field, 2, 2);
        assert!(lines.iter().all(|l| l.trim().is_empty()));
    }

    #[test]
    fn test_progress_line() {
        let mut progress = LoadingProgress::new();
        assert_eq!(progress_line(&progress, 10), "[----------]   0%");
        progress.advance(50.0);
        assert_eq!(progress_line(&progress, 10), "[#####-----]  50%");
        progress.advance(100.0);
        assert_eq!(progress_line(&progress, 10), "[##########] 100%");
    }
}
