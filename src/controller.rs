use crate::audio::{MediaEvent, MediaResource};
use crate::error::PlayerError;
use crate::model::{Catalog, PlayState, PlaybackSnapshot, PlaybackState, RepeatMode, Track};
use crate::sequencer;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// Normalized position, 0.0 is the start and 1.0 the end of the track.
    Fraction(f64),
    Absolute(Duration),
}

/// Owns the playback state and the media resource. Every method is one
/// synchronous reaction to a single user command or media event.
pub struct PlaybackController<M> {
    catalog: Catalog,
    state: PlaybackState,
    media: M,
    rng: SmallRng,
    source_loaded: bool,
    last_error: Option<PlayerError>,
    pub status: String,
    pub dirty: bool,
}

impl<M: MediaResource> PlaybackController<M> {
    pub fn new(catalog: Catalog, media: M) -> Self {
        Self::with_rng(catalog, media, SmallRng::from_os_rng())
    }

    pub fn with_seed(catalog: Catalog, media: M, seed: u64) -> Self {
        Self::with_rng(catalog, media, SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng(catalog: Catalog, media: M, rng: SmallRng) -> Self {
        Self {
            catalog,
            state: PlaybackState::default(),
            media,
            rng,
            source_loaded: false,
            last_error: None,
            status: String::from("Ready"),
            dirty: true,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn last_error(&self) -> Option<&PlayerError> {
        self.last_error.as_ref()
    }

    pub fn current_track(&self) -> &Track {
        &self.catalog.tracks()[self.state.current_index]
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_index: self.state.current_index,
            track: self.current_track().clone(),
            play_state: self.state.play_state,
            is_playing: self.state.is_playing(),
            repeat_mode: self.state.repeat_mode,
            shuffle_enabled: self.state.shuffle_enabled,
            position: self.state.position,
            duration: self.state.duration,
            volume: self.state.volume,
            error: self.last_error.as_ref().map(ToString::to_string),
        }
    }

    pub fn play(&mut self) {
        if self.state.is_playing() {
            return;
        }

        if !self.source_loaded {
            self.load_index(self.state.current_index);
            if !self.source_loaded {
                return;
            }
        }

        if let Err(err) = self.media.play() {
            self.on_load_error(self.state.current_index, format!("{err:#}"));
            return;
        }
        self.set_play_state(PlayState::Playing);
        self.last_error = None;
        self.set_status("Playing");
    }

    pub fn pause(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.media.pause();
        self.set_play_state(PlayState::Paused);
        self.set_status("Paused");
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Switches to `index`, keeping the current play/pause choice.
    pub fn load_track(&mut self, index: usize) -> Result<(), PlayerError> {
        let len = self.catalog.len();
        if index >= len {
            tracing::error!(index, len, "track index out of range");
            return Err(PlayerError::InvalidIndex { index, len });
        }
        self.load_index(index);
        Ok(())
    }

    pub fn select_track(&mut self, index: usize) -> Result<(), PlayerError> {
        self.load_track(index)?;
        self.play();
        Ok(())
    }

    pub fn next(&mut self) {
        let index = sequencer::next_index(&self.state, self.catalog.len());
        self.advance_to(index);
    }

    pub fn previous(&mut self) {
        let index = sequencer::prev_index(&self.state, self.catalog.len());
        self.advance_to(index);
    }

    /// Returns the absolute position sought to. Without a known duration the
    /// request is dropped and the position stays where it was.
    pub fn seek(&mut self, target: SeekTarget) -> Result<Duration, PlayerError> {
        let Some(duration) = self.state.duration else {
            tracing::debug!(?target, "seek dropped, duration unknown");
            return Err(PlayerError::MetadataUnavailable);
        };

        let absolute = match target {
            SeekTarget::Fraction(fraction) => {
                let fraction = if fraction.is_finite() {
                    fraction.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                duration.mul_f64(fraction)
            }
            SeekTarget::Absolute(position) => position.min(duration),
        };

        if let Err(err) = self.media.set_position(absolute) {
            tracing::warn!(error = %format!("{err:#}"), "seek failed");
            return Err(PlayerError::Seek(format!("{err:#}")));
        }
        self.state.position = absolute;
        self.dirty = true;
        Ok(absolute)
    }

    pub fn seek_by(&mut self, delta_seconds: f64) -> Result<Duration, PlayerError> {
        let Some(duration) = self.state.duration else {
            return Err(PlayerError::MetadataUnavailable);
        };
        let total = duration.as_secs_f64();
        let target = self.state.position.as_secs_f64() + delta_seconds;
        let target = if target.is_nan() { 0.0 } else { target.clamp(0.0, total) };
        self.seek(SeekTarget::Absolute(Duration::from_secs_f64(target)))
    }

    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        self.state.volume = volume.clamp(0.0, 1.0);
        self.media.set_volume(self.state.volume);
        self.set_status(&format!(
            "Volume: {}%",
            (self.state.volume * 100.0).round() as u16
        ));
    }

    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.state.repeat_mode = self.state.repeat_mode.next();
        tracing::debug!(repeat = ?self.state.repeat_mode, "repeat mode changed");
        self.set_status(&format!("Repeat: {}", self.state.repeat_mode.label()));
        self.state.repeat_mode
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.state.shuffle_enabled = !self.state.shuffle_enabled;
        self.state.shuffle_order = if self.state.shuffle_enabled {
            sequencer::enable_shuffle(
                self.state.current_index,
                self.catalog.len(),
                &mut self.rng,
            )
        } else {
            sequencer::disable_shuffle()
        };
        tracing::debug!(
            shuffle = self.state.shuffle_enabled,
            order = ?self.state.shuffle_order,
            "shuffle toggled"
        );
        self.set_status(if self.state.shuffle_enabled {
            "Shuffle on"
        } else {
            "Shuffle off"
        });
        self.state.shuffle_enabled
    }

    pub fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataReady(duration) => self.on_metadata_ready(duration),
            MediaEvent::PositionAdvanced(position) => self.on_position_advanced(position),
            MediaEvent::Ended => self.on_track_ended(),
            MediaEvent::Error(detail) => self.on_load_error(self.state.current_index, detail),
        }
    }

    pub fn on_metadata_ready(&mut self, duration: Option<Duration>) {
        self.state.duration = duration.filter(|d| !d.is_zero());
        self.dirty = true;
    }

    pub fn on_position_advanced(&mut self, position: Duration) {
        self.state.position = match self.state.duration {
            Some(duration) => position.min(duration),
            None => position,
        };
        self.dirty = true;
    }

    pub fn on_track_ended(&mut self) {
        let index = self.state.current_index;
        tracing::debug!(index, repeat = ?self.state.repeat_mode, "track ended");

        let next = sequencer::next_index(&self.state, self.catalog.len());
        match self.state.repeat_mode {
            RepeatMode::One => self.restart_current(),
            RepeatMode::All => self.advance_to(next),
            RepeatMode::None => {
                if !self.state.shuffle_enabled && index == self.catalog.last_index() {
                    self.stop_at_end();
                } else {
                    self.advance_to(next);
                }
            }
        }
    }

    /// Load failures pause playback on the failing track and stay visible
    /// until the next successful play; they never skip ahead.
    pub fn on_load_error(&mut self, index: usize, detail: String) {
        tracing::warn!(index, %detail, "media load error");
        if self.state.is_playing() {
            self.media.pause();
            self.set_play_state(PlayState::Paused);
        }
        let err = PlayerError::MediaLoad { index, detail };
        self.status = format!("playback error: {err}");
        self.last_error = Some(err);
        self.dirty = true;
    }

    fn load_index(&mut self, index: usize) {
        let Some(track) = self.catalog.get(index) else {
            return;
        };
        let locator = track.media.clone();
        let title = track.title.clone();

        self.state.current_index = index;
        self.state.position = Duration::ZERO;
        self.state.duration = None;
        self.dirty = true;

        if let Err(err) = self.media.load(&locator) {
            self.source_loaded = false;
            self.on_load_error(index, format!("{err:#}"));
            return;
        }
        self.source_loaded = true;
        self.media.set_volume(self.state.volume);
        tracing::info!(index, %title, %locator, "track loaded");

        if self.state.is_playing() {
            if let Err(err) = self.media.play() {
                self.on_load_error(index, format!("{err:#}"));
                return;
            }
            self.set_status(&format!("Playing {title}"));
        } else {
            self.set_status(&format!("Loaded {title}"));
        }
    }

    fn advance_to(&mut self, index: usize) {
        self.load_index(index);
        if self.source_loaded {
            self.play();
        }
    }

    fn restart_current(&mut self) {
        if let Err(err) = self.media.set_position(Duration::ZERO) {
            tracing::debug!(error = %format!("{err:#}"), "rewind failed, reloading source");
            self.load_index(self.state.current_index);
            if !self.source_loaded {
                return;
            }
        }
        self.state.position = Duration::ZERO;
        self.dirty = true;

        if self.state.is_playing() {
            if let Err(err) = self.media.play() {
                self.on_load_error(self.state.current_index, format!("{err:#}"));
            }
        } else {
            self.play();
        }
    }

    fn stop_at_end(&mut self) {
        self.media.pause();
        if let Err(err) = self.media.set_position(Duration::ZERO) {
            tracing::debug!(error = %format!("{err:#}"), "rewind after end failed");
        }
        self.state.position = Duration::ZERO;
        self.set_play_state(PlayState::Stopped);
        self.set_status("Reached end of catalog");
    }

    fn set_play_state(&mut self, next: PlayState) {
        if self.state.play_state != next {
            tracing::debug!(from = ?self.state.play_state, to = ?next, "play state");
            self.state.play_state = next;
        }
        self.dirty = true;
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Load(String),
        Play,
        Pause,
        SetPosition(Duration),
        SetVolume(f32),
    }

    #[derive(Default)]
    struct FakeMedia {
        calls: Vec<Call>,
        failing: Vec<String>,
        failing_seek: bool,
        duration: Option<Duration>,
    }

    impl MediaResource for FakeMedia {
        fn load(&mut self, locator: &str) -> Result<()> {
            self.calls.push(Call::Load(locator.to_string()));
            if self.failing.iter().any(|bad| bad == locator) {
                anyhow::bail!("file not found: {locator}");
            }
            Ok(())
        }

        fn play(&mut self) -> Result<()> {
            self.calls.push(Call::Play);
            Ok(())
        }

        fn pause(&mut self) {
            self.calls.push(Call::Pause);
        }

        fn set_position(&mut self, position: Duration) -> Result<()> {
            self.calls.push(Call::SetPosition(position));
            if self.failing_seek {
                anyhow::bail!("source cannot seek");
            }
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.calls.push(Call::SetVolume(volume));
        }

        fn duration(&self) -> Option<Duration> {
            self.duration
        }

        fn current_position(&self) -> Option<Duration> {
            None
        }

        fn poll_events(&mut self) -> Vec<MediaEvent> {
            Vec::new()
        }

        fn output_name(&self) -> String {
            String::from("fake")
        }
    }

    fn catalog(len: usize) -> Catalog {
        Catalog::new(
            (0..len)
                .map(|n| Track {
                    title: format!("song {n}"),
                    artist: String::from("artist"),
                    media: format!("song_{n}.mp3"),
                    artwork: None,
                })
                .collect(),
        )
        .expect("catalog")
    }

    fn controller(len: usize) -> PlaybackController<FakeMedia> {
        PlaybackController::with_seed(catalog(len), FakeMedia::default(), 42)
    }

    fn playing_at(len: usize, index: usize) -> PlaybackController<FakeMedia> {
        let mut player = controller(len);
        player.select_track(index).expect("select");
        player.media_mut().calls.clear();
        player
    }

    #[test]
    fn play_lazily_loads_the_first_track() {
        let mut player = controller(3);
        player.play();

        assert!(player.state().is_playing());
        assert_eq!(
            player.media().calls,
            vec![
                Call::Load(String::from("song_0.mp3")),
                Call::SetVolume(1.0),
                Call::Play
            ]
        );
    }

    #[test]
    fn play_and_pause_are_idempotent() {
        let mut player = playing_at(3, 0);
        player.play();
        assert!(player.media().calls.is_empty());

        player.pause();
        player.pause();
        assert_eq!(player.media().calls, vec![Call::Pause]);
        assert_eq!(player.state().play_state, PlayState::Paused);
    }

    #[test]
    fn pause_from_stopped_is_a_no_op() {
        let mut player = controller(2);
        player.pause();
        assert_eq!(player.state().play_state, PlayState::Stopped);
        assert!(player.media().calls.is_empty());
    }

    #[test]
    fn load_track_preserves_paused_state() {
        let mut player = controller(3);
        player.load_track(2).expect("load");

        assert_eq!(player.state().current_index, 2);
        assert!(!player.state().is_playing());
        assert!(!player.media().calls.contains(&Call::Play));
    }

    #[test]
    fn load_track_while_playing_keeps_playing() {
        let mut player = playing_at(3, 0);
        player.on_metadata_ready(Some(Duration::from_secs(100)));
        player.on_position_advanced(Duration::from_secs(30));

        player.load_track(1).expect("load");

        assert!(player.state().is_playing());
        assert_eq!(player.state().position, Duration::ZERO);
        assert_eq!(player.state().duration, None);
        assert_eq!(player.media().calls.last(), Some(&Call::Play));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut player = controller(3);
        assert_eq!(
            player.load_track(3),
            Err(PlayerError::InvalidIndex { index: 3, len: 3 })
        );
        assert_eq!(player.state().current_index, 0);
        assert!(player.media().calls.is_empty());
    }

    #[test]
    fn last_track_without_repeat_stops() {
        let mut player = playing_at(3, 2);
        player.on_position_advanced(Duration::from_secs(5));

        player.on_track_ended();

        let state = player.state();
        assert!(!state.is_playing());
        assert_eq!(state.play_state, PlayState::Stopped);
        assert_eq!(state.current_index, 2);
        assert_eq!(state.position, Duration::ZERO);
    }

    #[test]
    fn ended_track_advances_in_catalog_order() {
        let mut player = playing_at(3, 0);
        player.on_track_ended();

        assert_eq!(player.state().current_index, 1);
        assert!(player.state().is_playing());
    }

    #[test]
    fn repeat_one_restarts_the_same_track() {
        let mut player = playing_at(3, 1);
        player.cycle_repeat_mode();
        player.on_position_advanced(Duration::from_secs(12));

        player.on_track_ended();

        assert_eq!(player.state().current_index, 1);
        assert_eq!(player.state().position, Duration::ZERO);
        assert!(player.state().is_playing());
        assert!(
            player
                .media()
                .calls
                .contains(&Call::SetPosition(Duration::ZERO))
        );
    }

    #[test]
    fn repeat_all_wraps_from_last_to_first() {
        let mut player = playing_at(3, 2);
        player.cycle_repeat_mode();
        player.cycle_repeat_mode();

        player.on_track_ended();

        assert_eq!(player.state().current_index, 0);
        assert!(player.state().is_playing());
    }

    #[test]
    fn repeat_all_follows_shuffle_order() {
        let mut player = playing_at(3, 2);
        player.state.repeat_mode = RepeatMode::All;
        player.state.shuffle_enabled = true;
        player.state.shuffle_order = vec![2, 0, 1];

        player.on_track_ended();

        assert_eq!(player.state().current_index, 0);
    }

    #[test]
    fn shuffled_last_track_keeps_going_without_repeat() {
        let mut player = playing_at(3, 2);
        player.state.shuffle_enabled = true;
        player.state.shuffle_order = vec![0, 2, 1];

        player.on_track_ended();

        assert_eq!(player.state().current_index, 1);
        assert!(player.state().is_playing());
    }

    #[test]
    fn toggling_shuffle_keeps_current_track_first() {
        let mut player = playing_at(8, 5);
        assert!(player.toggle_shuffle());

        let order = player.state().shuffle_order.clone();
        assert_eq!(order.len(), 8);
        assert_eq!(order[0], 5);
        assert_eq!(player.state().current_index, 5);
        assert!(player.media().calls.is_empty());

        assert!(!player.toggle_shuffle());
        assert!(player.state().shuffle_order.is_empty());
    }

    #[test]
    fn seeded_controllers_shuffle_identically() {
        let mut first = controller(10);
        let mut second = controller(10);
        first.toggle_shuffle();
        second.toggle_shuffle();
        assert_eq!(first.state().shuffle_order, second.state().shuffle_order);
    }

    #[test]
    fn volume_is_clamped() {
        let mut player = controller(1);
        player.set_volume(1.5);
        assert_eq!(player.state().volume, 1.0);
        player.set_volume(-0.2);
        assert_eq!(player.state().volume, 0.0);
        assert_eq!(
            player.media().calls,
            vec![Call::SetVolume(1.0), Call::SetVolume(0.0)]
        );

        player.set_volume(f32::NAN);
        assert_eq!(player.state().volume, 0.0);
    }

    #[test]
    fn seek_before_metadata_is_dropped() {
        let mut player = playing_at(2, 0);
        player.on_position_advanced(Duration::from_secs(3));

        assert_eq!(
            player.seek(SeekTarget::Fraction(0.5)),
            Err(PlayerError::MetadataUnavailable)
        );
        assert_eq!(player.state().position, Duration::from_secs(3));
        assert!(player.media().calls.is_empty());
    }

    #[test]
    fn seek_fraction_maps_onto_duration() {
        let mut player = playing_at(2, 0);
        player.on_metadata_ready(Some(Duration::from_secs(200)));

        let target = player.seek(SeekTarget::Fraction(0.25)).expect("seek");
        assert_eq!(target, Duration::from_secs(50));
        assert_eq!(player.state().position, Duration::from_secs(50));
        assert_eq!(
            player.media().calls,
            vec![Call::SetPosition(Duration::from_secs(50))]
        );

        let clamped = player.seek(SeekTarget::Fraction(3.0)).expect("seek");
        assert_eq!(clamped, Duration::from_secs(200));
        let absolute = player
            .seek(SeekTarget::Absolute(Duration::from_secs(900)))
            .expect("seek");
        assert_eq!(absolute, Duration::from_secs(200));
    }

    #[test]
    fn seek_by_does_not_go_negative() {
        let mut player = playing_at(2, 0);
        player.on_metadata_ready(Some(Duration::from_secs(60)));
        player.on_position_advanced(Duration::from_secs(3));

        assert_eq!(player.seek_by(-5.0), Ok(Duration::ZERO));
        assert_eq!(player.seek_by(10.0), Ok(Duration::from_secs(10)));
    }

    #[test]
    fn seek_by_huge_deltas_clamps_to_the_track() {
        let mut player = playing_at(2, 0);
        assert_eq!(player.seek_by(f64::MAX), Err(PlayerError::MetadataUnavailable));

        player.on_metadata_ready(Some(Duration::from_secs(60)));
        assert_eq!(player.seek_by(f64::MAX), Ok(Duration::from_secs(60)));
        assert_eq!(player.seek_by(f64::INFINITY), Ok(Duration::from_secs(60)));
        assert_eq!(player.seek_by(f64::NEG_INFINITY), Ok(Duration::ZERO));
        assert_eq!(player.seek_by(f64::NAN), Ok(Duration::ZERO));
        assert_eq!(player.state().position, Duration::ZERO);
    }

    #[test]
    fn failed_rewind_and_reload_on_repeat_one_loads_once() {
        let mut player = playing_at(2, 1);
        player.cycle_repeat_mode();
        player.media_mut().failing_seek = true;
        player.media_mut().failing.push(String::from("song_1.mp3"));

        player.on_track_ended();

        let loads = player
            .media()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Load(_)))
            .count();
        assert_eq!(loads, 1);
        assert_eq!(player.state().current_index, 1);
        assert_eq!(player.state().play_state, PlayState::Paused);
        assert!(matches!(
            player.last_error(),
            Some(PlayerError::MediaLoad { index: 1, .. })
        ));
    }

    #[test]
    fn zero_duration_is_treated_as_unknown() {
        let mut player = controller(1);
        player.on_metadata_ready(Some(Duration::ZERO));
        assert_eq!(player.state().duration, None);
    }

    #[test]
    fn position_is_capped_at_duration() {
        let mut player = controller(1);
        player.on_metadata_ready(Some(Duration::from_secs(10)));
        player.on_position_advanced(Duration::from_secs(11));
        assert_eq!(player.state().position, Duration::from_secs(10));
    }

    #[test]
    fn load_error_pauses_without_advancing() {
        let mut player = controller(3);
        player.media_mut().failing.push(String::from("song_1.mp3"));
        player.play();

        player.next();

        let state = player.state();
        assert_eq!(state.current_index, 1);
        assert!(!state.is_playing());
        assert!(matches!(
            player.last_error(),
            Some(PlayerError::MediaLoad { index: 1, .. })
        ));
        assert!(player.snapshot().error.is_some());
        assert!(player.status.starts_with("playback error"));
    }

    #[test]
    fn error_event_is_reported_against_current_track() {
        let mut player = playing_at(3, 2);
        player.handle_media_event(MediaEvent::Error(String::from("decode failed")));

        assert!(!player.state().is_playing());
        assert_eq!(player.state().current_index, 2);
        assert_eq!(
            player.last_error(),
            Some(&PlayerError::MediaLoad {
                index: 2,
                detail: String::from("decode failed")
            })
        );
    }

    #[test]
    fn successful_play_clears_surfaced_error() {
        let mut player = playing_at(3, 0);
        player.on_load_error(0, String::from("glitch"));
        assert!(player.last_error().is_some());

        player.play();
        assert!(player.last_error().is_none());
        assert!(player.state().is_playing());
    }

    #[test]
    fn next_and_previous_start_playback() {
        let mut player = controller(3);
        player.previous();
        assert_eq!(player.state().current_index, 2);
        assert!(player.state().is_playing());

        player.next();
        assert_eq!(player.state().current_index, 0);
    }

    #[test]
    fn single_track_next_reloads_itself() {
        let mut player = playing_at(1, 0);
        player.next();
        assert_eq!(player.state().current_index, 0);
        assert_eq!(
            player.media().calls.first(),
            Some(&Call::Load(String::from("song_0.mp3")))
        );
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut player = playing_at(3, 1);
        player.cycle_repeat_mode();
        player.set_volume(0.4);

        let snapshot = player.snapshot();
        assert_eq!(snapshot.current_index, 1);
        assert_eq!(snapshot.track.title, "song 1");
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.repeat_mode, RepeatMode::One);
        assert!(!snapshot.shuffle_enabled);
        assert_eq!(snapshot.volume, 0.4);
        assert_eq!(snapshot.error, None);
    }

    proptest::proptest! {
        #[test]
        fn state_invariants_hold_after_random_commands(
            len in 1usize..12,
            ops in proptest::collection::vec(0u8..10, 1..200),
        ) {
            let mut player = controller(len);
            player.on_metadata_ready(Some(Duration::from_secs(120)));

            for op in ops {
                match op {
                    0 => player.play(),
                    1 => player.pause(),
                    2 => player.next(),
                    3 => player.previous(),
                    4 => { player.cycle_repeat_mode(); }
                    5 => { player.toggle_shuffle(); }
                    6 => player.on_track_ended(),
                    7 => { let _ = player.seek(SeekTarget::Fraction(0.5)); }
                    8 => player.set_volume(1.7),
                    _ => { let _ = player.select_track(len - 1); }
                }

                let state = player.state();
                proptest::prop_assert!(state.current_index < len);
                proptest::prop_assert!((0.0..=1.0).contains(&state.volume));
                if state.shuffle_enabled {
                    let mut sorted = state.shuffle_order.clone();
                    sorted.sort_unstable();
                    proptest::prop_assert_eq!(sorted, (0..len).collect::<Vec<_>>());
                } else {
                    proptest::prop_assert!(state.shuffle_order.is_empty());
                }
            }
        }
    }
}
