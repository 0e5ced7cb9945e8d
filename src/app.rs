use crate::audio::{MediaResource, NullMediaResource, RodioMediaResource};
use crate::config::Settings;
use crate::controller::{PlaybackController, SeekTarget};
use crate::error::PlayerError;
use crate::library;
use crate::model::Catalog;
use crate::ui::{self, PlayerView};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::time::{Duration, Instant};

const VOLUME_STEP: f32 = 0.05;

pub struct AppStartupOptions {
    pub catalog: Catalog,
    pub settings: Settings,
    pub null_audio: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn run_with_startup(options: AppStartupOptions) -> Result<()> {
    let media: Box<dyn MediaResource> = if options.null_audio {
        Box::new(NullMediaResource::new())
    } else {
        match RodioMediaResource::new() {
            Ok(engine) => Box::new(engine),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "audio output unavailable, using null output");
                Box::new(NullMediaResource::new())
            }
        }
    };

    let mut view = PlayerView {
        selected: 0,
        show_playlist: true,
        command_mode: false,
        command_buffer: String::new(),
        durations: library::probe_durations(&options.catalog),
        output_name: media.output_name(),
    };

    let mut player = match options.seed {
        Some(seed) => PlaybackController::with_seed(options.catalog, media, seed),
        None => PlaybackController::new(options.catalog, media),
    };
    player.set_volume(options.settings.volume);
    player.load_track(0)?;
    let seek_step = f64::from(options.settings.seek_step_seconds.max(1));

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut last_tick = Instant::now();
    let result: Result<()> = loop {
        pump_media_events(&mut player);

        if player.dirty || last_tick.elapsed() > Duration::from_millis(250) {
            terminal.draw(|frame| ui::draw(frame, &player, &view))?;
            player.dirty = false;
            last_tick = Instant::now();
        }

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if handle_key(&mut player, &mut view, key, seek_step) == Flow::Quit {
            break Ok(());
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// Drains the resource's pending callbacks into the controller, one at a time.
pub fn pump_media_events<M: MediaResource>(player: &mut PlaybackController<M>) {
    let events = player.media_mut().poll_events();
    for event in events {
        player.handle_media_event(event);
    }
}

pub fn handle_key<M: MediaResource>(
    player: &mut PlaybackController<M>,
    view: &mut PlayerView,
    key: KeyEvent,
    seek_step: f64,
) -> Flow {
    if view.command_mode {
        match key.code {
            KeyCode::Esc => {
                view.command_mode = false;
                view.command_buffer.clear();
            }
            KeyCode::Enter => {
                let command = std::mem::take(&mut view.command_buffer);
                view.command_mode = false;
                run_command(player, view, &command);
            }
            KeyCode::Backspace => {
                view.command_buffer.pop();
            }
            KeyCode::Char(ch) => view.command_buffer.push(ch),
            _ => {}
        }
        player.dirty = true;
        return Flow::Continue;
    }

    let last = player.catalog().last_index();
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Flow::Quit,
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Down => view.selected = (view.selected + 1).min(last),
        KeyCode::Up => view.selected = view.selected.saturating_sub(1),
        KeyCode::Enter => {
            if let Err(err) = player.select_track(view.selected.min(last)) {
                player.status = format!("playback error: {err}");
            }
        }
        KeyCode::Char(' ') => player.toggle_play_pause(),
        KeyCode::Char('n') => player.next(),
        KeyCode::Char('b') => player.previous(),
        KeyCode::Char('r') => {
            player.cycle_repeat_mode();
        }
        KeyCode::Char('s') => {
            player.toggle_shuffle();
        }
        KeyCode::Right => report_seek(player, |p| p.seek_by(seek_step)),
        KeyCode::Left => report_seek(player, |p| p.seek_by(-seek_step)),
        KeyCode::Char(digit @ '0'..='9') => {
            let fraction = f64::from(digit.to_digit(10).unwrap_or(0)) / 10.0;
            report_seek(player, |p| p.seek(SeekTarget::Fraction(fraction)));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let next = player.state().volume + VOLUME_STEP;
            player.set_volume(next);
        }
        KeyCode::Char('-') => {
            let next = player.state().volume - VOLUME_STEP;
            player.set_volume(next);
        }
        KeyCode::Char('p') => view.show_playlist = !view.show_playlist,
        KeyCode::Char(':') => view.command_mode = true,
        _ => {}
    }
    player.dirty = true;
    Flow::Continue
}

fn report_seek<M: MediaResource>(
    player: &mut PlaybackController<M>,
    seek: impl FnOnce(&mut PlaybackController<M>) -> Result<Duration, PlayerError>,
) {
    match seek(player) {
        Ok(position) => player.status = format!("Seek: {}", ui::format_time(Some(position))),
        Err(PlayerError::MetadataUnavailable) => {
            player.status = String::from("Duration unknown, seek ignored");
        }
        Err(err) => player.status = format!("seek error: {err}"),
    }
    player.dirty = true;
}

pub fn run_command<M: MediaResource>(
    player: &mut PlaybackController<M>,
    view: &mut PlayerView,
    raw: &str,
) {
    let input = raw.trim();
    if input.is_empty() {
        player.status = String::from("No command");
        player.dirty = true;
        return;
    }

    let mut command_split = input.splitn(2, char::is_whitespace);
    let command = command_split.next().unwrap_or_default();
    let rest = command_split.next().unwrap_or("").trim();

    match command {
        "help" => {
            player.status = String::from(
                "Commands: seek <pct>%|<secs> | volume <0..1> | play <n> | repeat | shuffle | playlist",
            );
        }
        "seek" => {
            if let Some(percent) = rest.strip_suffix('%') {
                match percent.trim().parse::<f64>() {
                    Ok(value) => {
                        report_seek(player, |p| p.seek(SeekTarget::Fraction(value / 100.0)))
                    }
                    Err(_) => player.status = String::from("Usage: seek <pct>%|<secs>"),
                }
            } else {
                match rest.parse::<f64>().ok().map(Duration::try_from_secs_f64) {
                    Some(Ok(position)) => {
                        report_seek(player, |p| p.seek(SeekTarget::Absolute(position)))
                    }
                    _ => player.status = String::from("Usage: seek <pct>%|<secs>"),
                }
            }
        }
        "volume" => match rest.parse::<f32>() {
            Ok(value) => player.set_volume(value),
            Err(_) => player.status = String::from("Usage: volume <0..1>"),
        },
        "play" => match rest.parse::<usize>() {
            Ok(number) if number >= 1 => {
                if let Err(err) = player.select_track(number - 1) {
                    player.status = format!("playback error: {err}");
                } else {
                    view.selected = number - 1;
                }
            }
            _ => player.status = String::from("Usage: play <n>"),
        },
        "repeat" => {
            player.cycle_repeat_mode();
        }
        "shuffle" => {
            player.toggle_shuffle();
        }
        "playlist" => view.show_playlist = !view.show_playlist,
        _ => player.status = String::from("Unknown command. Use :help"),
    }
    player.dirty = true;
}
