use std::fs::File;
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use env_logger::{Env, Target};
use log::{info, warn};

use pacman_arcade::config::Config;
use pacman_arcade::error::GameResult;
use pacman_arcade::input::HeldKeys;
use pacman_arcade::render::{draw_session, Frame, TerminalRenderer};
use pacman_arcade::session::Session;

fn main() -> GameResult<()> {
    let config = Config::from_env()?;
    init_logging(&config)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;
    let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        stdout.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }

    let result = run(&mut stdout, &config);
    let restored = restore_terminal(&mut stdout, enhanced);

    if let Err(err) = &result {
        warn!("session ended with an error: {err}");
    }
    result?;
    Ok(restored?)
}

/// Runs every teardown step, even after one fails, and reports the first failure.
fn restore_terminal(stdout: &mut Stdout, enhanced: bool) -> io::Result<()> {
    let pop = if enhanced {
        stdout.execute(PopKeyboardEnhancementFlags).map(drop)
    } else {
        Ok(())
    };
    let show = stdout.execute(Show).map(drop);
    let leave = stdout.execute(LeaveAlternateScreen).map(drop);
    let raw = terminal::disable_raw_mode();
    first_error([pop, show, leave, raw])
}

fn first_error(steps: impl IntoIterator<Item = io::Result<()>>) -> io::Result<()> {
    steps.into_iter().find(Result::is_err).unwrap_or(Ok(()))
}

/// Sends logs to `PACMAN_LOG`; the terminal itself belongs to the game.
fn init_logging(config: &Config) -> GameResult<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()?;
    info!("logging to {}", path.display());
    Ok(())
}

fn run(stdout: &mut Stdout, config: &Config) -> GameResult<()> {
    let mut session = Session::new(config);
    let mut keys = HeldKeys::new(config.hold);
    let mut renderer = TerminalRenderer::new(config.glyphs);
    let frame_time = config.tick();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(command) = keys.observe(&key, Instant::now()) {
                    session.handle(command);
                }
            }
        }
        if let Some(command) = keys.expire(Instant::now()) {
            session.handle(command);
        }
        if session.should_quit() {
            return Ok(());
        }

        session.tick();

        let maze = session.maze();
        let mut frame = Frame::new(maze.width(), maze.height());
        draw_session(&session, &mut frame);
        renderer.render(stdout, &frame, terminal::size()?)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}
