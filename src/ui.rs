use crate::audio::MediaResource;
use crate::controller::PlaybackController;
use crate::model::{PlayState, RepeatMode};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use std::time::Duration;

const APP_TITLE: &str = "Jukebox  ";

const BG: Color = Color::Rgb(10, 15, 24);
const PANEL_BG: Color = Color::Rgb(19, 29, 43);
const PANEL_ALT_BG: Color = Color::Rgb(24, 38, 58);
const BORDER: Color = Color::Rgb(69, 121, 176);
const TEXT: Color = Color::Rgb(214, 228, 248);
const MUTED: Color = Color::Rgb(149, 173, 204);
const ACCENT: Color = Color::Rgb(29, 185, 84);
const ALERT: Color = Color::Rgb(249, 174, 88);
const SELECTED_BG: Color = Color::Rgb(34, 55, 82);

/// Presentation-only state kept by the host loop.
pub struct PlayerView {
    pub selected: usize,
    pub show_playlist: bool,
    pub command_mode: bool,
    pub command_buffer: String,
    pub durations: Vec<Option<Duration>>,
    pub output_name: String,
}

pub fn draw<M: MediaResource>(frame: &mut Frame, player: &PlaybackController<M>, view: &PlayerView) {
    frame.render_widget(
        Block::default().style(Style::default().bg(BG)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let state = player.state();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            APP_TITLE,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("Tracks {}", player.catalog().len()),
            Style::default().fg(TEXT),
        ),
        Span::styled("  |  ", Style::default().fg(MUTED)),
        Span::styled(
            format!("Repeat {}", state.repeat_mode.label()),
            Style::default().fg(toggle_color(state.repeat_mode != RepeatMode::None)),
        ),
        Span::styled("  |  ", Style::default().fg(MUTED)),
        Span::styled(
            format!("Shuffle {}", if state.shuffle_enabled { "On" } else { "Off" }),
            Style::default().fg(toggle_color(state.shuffle_enabled)),
        ),
        Span::styled("  |  ", Style::default().fg(MUTED)),
        Span::styled(view.output_name.as_str(), Style::default().fg(MUTED)),
    ]))
    .block(panel_block("Status", PANEL_BG));
    frame.render_widget(header, vertical[0]);

    let body = if view.show_playlist {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(vertical[1])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(0), Constraint::Percentage(100)])
            .split(vertical[1])
    };

    if view.show_playlist {
        draw_playlist(frame, player, view, body[0]);
    }
    draw_now_playing(frame, player, body[1]);

    let timeline = Paragraph::new(Span::styled(
        timeline_line(player, 26, 14),
        Style::default().fg(TEXT),
    ))
    .block(panel_block("Timeline", PANEL_BG))
    .wrap(Wrap { trim: true });
    frame.render_widget(timeline, vertical[2]);

    let footer = if view.command_mode {
        Paragraph::new(Line::from(vec![
            Span::styled(":", Style::default().fg(ACCENT)),
            Span::styled(view.command_buffer.as_str(), Style::default().fg(TEXT)),
        ]))
    } else {
        Paragraph::new(Line::from(vec![
            Span::styled(
                "space play/pause, n/b next/prev, r repeat, s shuffle, arrows seek, 0-9 jump, +/- vol, p list, : cmd, q quit",
                Style::default().fg(MUTED),
            ),
            Span::styled("  |  ", Style::default().fg(MUTED)),
            Span::styled(player.status.as_str(), status_style(player)),
        ]))
    };
    frame.render_widget(footer.block(panel_block("Message", PANEL_BG)), vertical[3]);
}

fn draw_playlist<M: MediaResource>(
    frame: &mut Frame,
    player: &PlaybackController<M>,
    view: &PlayerView,
    area: Rect,
) {
    let current = player.state().current_index;
    let items: Vec<ListItem> = player
        .catalog()
        .tracks()
        .iter()
        .enumerate()
        .map(|(idx, track)| {
            let marker = if idx == current { "  > " } else { "    " };
            let duration = match view.durations.get(idx) {
                Some(Some(duration)) => format_time(Some(*duration)),
                Some(None) => String::from("Error"),
                None => String::new(),
            };
            let title_style = if idx == current {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(MUTED)),
                Span::styled(format!("{} - {}", track.title, track.artist), title_style),
                Span::styled(format!("  {duration}"), Style::default().fg(MUTED)),
            ]))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(view.selected.min(player.catalog().last_index())));

    let list = List::new(items)
        .block(panel_block("Playlist", PANEL_BG))
        .highlight_style(
            Style::default()
                .bg(SELECTED_BG)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("-> ");
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_now_playing<M: MediaResource>(frame: &mut Frame, player: &PlaybackController<M>, area: Rect) {
    let state = player.state();
    let track = player.current_track();
    let play_label = match state.play_state {
        PlayState::Playing => "Playing",
        PlayState::Paused => "Paused",
        PlayState::Stopped => "Stopped",
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                "Now",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", track.title), Style::default().fg(TEXT)),
        ]),
        Line::from(Span::styled(
            format!("Artist  {}", track.artist),
            Style::default().fg(MUTED),
        )),
        Line::from(Span::styled(
            format!("Art     {}", track.artwork_or_default()),
            Style::default().fg(MUTED),
        )),
        Line::from(Span::styled(
            format!(
                "Track   {}/{}",
                state.current_index + 1,
                player.catalog().len()
            ),
            Style::default().fg(ALERT),
        )),
        Line::from(Span::styled(
            format!("State   {play_label}"),
            Style::default().fg(toggle_color(state.is_playing())),
        )),
    ];
    if let Some(err) = player.last_error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(ALERT),
        )));
    }

    let info = Paragraph::new(lines)
        .block(panel_block("Song Info", PANEL_ALT_BG))
        .wrap(Wrap { trim: true });
    frame.render_widget(info, area);
}

fn panel_block(title: &str, bg: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(BORDER))
        .style(Style::default().bg(bg))
}

fn toggle_color(active: bool) -> Color {
    if active { ACCENT } else { TEXT }
}

fn status_style<M: MediaResource>(player: &PlaybackController<M>) -> Style {
    if player.last_error().is_some() {
        Style::default().fg(ALERT)
    } else {
        Style::default().fg(TEXT)
    }
}

/// `m:ss`, with unknown times shown as `0:00`.
pub fn format_time(time: Option<Duration>) -> String {
    let Some(time) = time else {
        return String::from("0:00");
    };
    let total_seconds = time.as_secs();
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

fn progress_bar(ratio: Option<f64>, width: usize) -> String {
    let clamped = ratio.unwrap_or(0.0).clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&"-".repeat(width.saturating_sub(filled)));
    bar.push(']');
    bar
}

fn progress_ratio(position: Duration, duration: Option<Duration>) -> Option<f64> {
    duration.and_then(|duration| {
        let total_secs = duration.as_secs_f64();
        (total_secs > 0.0).then_some((position.as_secs_f64() / total_secs).clamp(0.0, 1.0))
    })
}

fn timeline_line<M: MediaResource>(
    player: &PlaybackController<M>,
    timeline_bar_width: usize,
    volume_bar_width: usize,
) -> String {
    let state = player.state();
    let volume_percent = (state.volume * 100.0).round() as u16;

    format!(
        "{} / {} {}  |  Vol {} {:>3}%",
        format_time(Some(state.position)),
        format_time(state.duration),
        progress_bar(
            progress_ratio(state.position, state.duration),
            timeline_bar_width
        ),
        progress_bar(Some(f64::from(state.volume)), volume_bar_width),
        volume_percent
    )
}
