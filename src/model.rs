use crate::error::PlayerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ARTWORK: &str = "images/default.jpg";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    #[serde(alias = "src")]
    pub media: String,
    #[serde(default, alias = "img", skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
}

impl Track {
    pub fn artwork_or_default(&self) -> &str {
        self.artwork
            .as_deref()
            .filter(|locator| !locator.trim().is_empty())
            .unwrap_or(DEFAULT_ARTWORK)
    }
}

/// Ordered track list for one session. Never empty and never reordered, so a
/// track's index is its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Result<Self, PlayerError> {
        if tracks.is_empty() {
            return Err(PlayerError::EmptyCatalog);
        }
        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn last_index(&self) -> usize {
        self.tracks.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RepeatMode {
    #[default]
    None,
    One,
    All,
}

impl RepeatMode {
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::One,
            Self::One => Self::All,
            Self::All => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Off",
            Self::One => "One",
            Self::All => "All",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub play_state: PlayState,
    pub repeat_mode: RepeatMode,
    pub shuffle_enabled: bool,
    pub shuffle_order: Vec<usize>,
    pub volume: f32,
    pub position: Duration,
    pub duration: Option<Duration>,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.play_state == PlayState::Playing
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_index: 0,
            play_state: PlayState::Stopped,
            repeat_mode: RepeatMode::None,
            shuffle_enabled: false,
            shuffle_order: Vec::new(),
            volume: 1.0,
            position: Duration::ZERO,
            duration: None,
        }
    }
}

/// Read-only view handed to whatever draws the player.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSnapshot {
    pub current_index: usize,
    pub track: Track,
    pub play_state: PlayState,
    pub is_playing: bool,
    pub repeat_mode: RepeatMode,
    pub shuffle_enabled: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str) -> Track {
        Track {
            title: name.to_string(),
            artist: String::from("artist"),
            media: format!("{name}.mp3"),
            artwork: None,
        }
    }

    #[test]
    fn repeat_mode_cycles_back_to_none() {
        let mode = RepeatMode::None.next().next().next();
        assert_eq!(mode, RepeatMode::None);
        assert_eq!(RepeatMode::None.next(), RepeatMode::One);
        assert_eq!(RepeatMode::One.next(), RepeatMode::All);
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert_eq!(Catalog::new(Vec::new()), Err(PlayerError::EmptyCatalog));
    }

    #[test]
    fn catalog_reports_last_index() {
        let catalog = Catalog::new(vec![track("a"), track("b"), track("c")]).expect("catalog");
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.last_index(), 2);
        assert_eq!(catalog.get(1).map(|t| t.title.as_str()), Some("b"));
        assert!(catalog.get(3).is_none());
    }

    #[test]
    fn artwork_falls_back_to_default() {
        let mut song = track("a");
        assert_eq!(song.artwork_or_default(), DEFAULT_ARTWORK);
        song.artwork = Some(String::from("   "));
        assert_eq!(song.artwork_or_default(), DEFAULT_ARTWORK);
        song.artwork = Some(String::from("images/a.png"));
        assert_eq!(song.artwork_or_default(), "images/a.png");
    }

    #[test]
    fn track_accepts_short_field_aliases() {
        let raw = r#"{"title":"Kids","artist":"Kyle Dixon","src":"music/kids.mp3","img":"images/st.png"}"#;
        let parsed: Track = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.media, "music/kids.mp3");
        assert_eq!(parsed.artwork.as_deref(), Some("images/st.png"));
    }

    #[test]
    fn initial_state_is_stopped_at_first_track() {
        let state = PlaybackState::default();
        assert_eq!(state.current_index, 0);
        assert!(!state.is_playing());
        assert_eq!(state.repeat_mode, RepeatMode::None);
        assert!(!state.shuffle_enabled);
        assert!(state.shuffle_order.is_empty());
        assert_eq!(state.duration, None);
    }
}
