use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use heartworks::{
    Clock, FramePacer, ManualClock, Recorder, Result, Rgb, Show, ShowConfig, SystemClock,
    TerminalSurface,
};
use std::io::{self, BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, error, info, trace};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

// Headless runs simulate a 200x50 terminal at 60 fps
const HEADLESS_WIDTH: f32 = 1600.0;
const HEADLESS_HEIGHT: f32 = 800.0;
const HEADLESS_FRAME_MS: u64 = 16;

/// Countdown, fireworks and messages in the terminal.
///
/// Press 'q', ESC, or Ctrl+C to exit.
#[derive(Parser, Debug)]
#[command(name = "heartworks", version, about)]
struct Cli {
    /// Show configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Background color as hex, e.g. 1a1b26
    #[arg(long, value_parser = parse_color, default_value = "000000")]
    bg_color: Rgb,

    /// Frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Write logs to this file (the terminal itself is busy drawing)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "heartworks::show=trace"
    #[arg(long, default_value = "info", value_parser = parse_filter)]
    log_level: String,

    /// Run this many frames without a terminal and print the totals
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u32>,
}

fn parse_color(hex: &str) -> std::result::Result<Rgb, String> {
    Rgb::from_hex(hex).ok_or_else(|| format!("expected RRGGBB (e.g. 1a1b26), got '{hex}'"))
}

fn parse_filter(directives: &str) -> std::result::Result<String, String> {
    EnvFilter::try_new(directives)
        .map(|_| directives.to_string())
        .map_err(|e| format!("invalid log filter '{directives}': {e}"))
}

fn setup_logging(cli: &Cli) -> Option<WorkerGuard> {
    // Already checked by parse_filter
    let filter = EnvFilter::new(&cli.log_level);

    if let Some(path) = &cli.log_file {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path.file_name()?;
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(writer)
            .init();
        return Some(guard);
    }

    // Without a log file, only headless runs can afford to print
    if cli.headless.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    }
    None
}

fn is_quit(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && (key.code == KeyCode::Char('q')
            || key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)))
}

fn run_terminal(show: &mut Show, bg: Rgb, fps: u32) -> io::Result<()> {
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout());

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;

    let result = drive(show, &mut stdout, bg, fps);

    execute!(stdout, cursor::Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn drive<W: Write>(show: &mut Show, out: &mut W, bg: Rgb, fps: u32) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut surface = TerminalSurface::new(cols as usize, rows as usize, bg);
    let clock = SystemClock::new();
    let mut pacer = FramePacer::new(fps);
    info!(cols, rows, fps, "terminal show started");

    loop {
        if event::poll(pacer.remaining(Instant::now()))? {
            match event::read()? {
                Event::Key(key) if is_quit(&key) => break,
                Event::Resize(cols, rows) => {
                    debug!(cols, rows, "terminal resized");
                    surface.resize(cols as usize, rows as usize);
                    execute!(out, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        if pacer.ready(Instant::now()) {
            let report = show.tick(clock.now_ms(), &mut surface);
            trace!(phase = ?report.phase, fireworks = report.fireworks, "frame");
            surface.present(out)?;
        }
    }

    let stats = show.stats();
    info!(frames = stats.frames, cycles = stats.cycles, "terminal show stopped");
    Ok(())
}

fn run_headless(show: &mut Show, frames: u32) {
    let clock = ManualClock::new(0);
    let mut surface = Recorder::new(HEADLESS_WIDTH, HEADLESS_HEIGHT);
    let mut ops = 0usize;

    for _ in 0..frames {
        let report = show.tick(clock.now_ms(), &mut surface);
        trace!(now = clock.now_ms(), phase = ?report.phase, fireworks = report.fireworks, "frame");
        ops += surface.take().len();
        clock.advance(HEADLESS_FRAME_MS);
    }

    let stats = show.stats();
    info!(
        frames = stats.frames,
        countdown_ticks = stats.countdown_ticks,
        launches = stats.launches,
        cycles = stats.cycles,
        restarts = stats.restarts,
        draw_ops = ops,
        "headless run finished"
    );
    println!("{stats:?}");
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ShowConfig::load(path)?,
        None => ShowConfig::default(),
    };
    let mut show = Show::new(config)?;

    match cli.headless {
        Some(frames) => run_headless(&mut show, frames),
        None => run_terminal(&mut show, cli.bg_color, cli.fps)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = setup_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("heartworks: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_is_validated() {
        let cli = Cli::try_parse_from(["heartworks", "--log-level", "heartworks::show=trace"]).unwrap();
        assert_eq!(cli.log_level, "heartworks::show=trace");

        let err = Cli::try_parse_from(["heartworks", "--log-level", "heartworks=loud"]).unwrap_err();
        assert!(err.to_string().contains("heartworks=loud"));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["heartworks"]).unwrap();
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.bg_color, Rgb::BLACK);
        assert_eq!(cli.fps, 60);
        assert!(Cli::try_parse_from(["heartworks", "--bg-color", "zzz"]).is_err());
    }
}
