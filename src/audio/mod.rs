use anyhow::{Context, Result};
use rodio::Source;
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
#[cfg(unix)]
use std::ffi::CString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::time::Instant;

/// Lifecycle callbacks a media resource reports back to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Source is decodable; carries the duration when the container reports one.
    MetadataReady(Option<Duration>),
    PositionAdvanced(Duration),
    Ended,
    Error(String),
}

/// Opaque playback primitive. Loads are fire-and-forget: a later `load`
/// replaces whatever source was in flight, and outcomes arrive through
/// `poll_events`.
pub trait MediaResource {
    fn load(&mut self, locator: &str) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn set_position(&mut self, position: Duration) -> Result<()>;
    fn set_volume(&mut self, volume: f32);
    fn duration(&self) -> Option<Duration>;
    fn current_position(&self) -> Option<Duration>;
    fn poll_events(&mut self) -> Vec<MediaEvent>;
    fn output_name(&self) -> String;
}

impl<T: MediaResource + ?Sized> MediaResource for Box<T> {
    fn load(&mut self, locator: &str) -> Result<()> {
        (**self).load(locator)
    }

    fn play(&mut self) -> Result<()> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn set_position(&mut self, position: Duration) -> Result<()> {
        (**self).set_position(position)
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume)
    }

    fn duration(&self) -> Option<Duration> {
        (**self).duration()
    }

    fn current_position(&self) -> Option<Duration> {
        (**self).current_position()
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        (**self).poll_events()
    }

    fn output_name(&self) -> String {
        (**self).output_name()
    }
}

pub fn is_network_locator(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn local_path(locator: &str) -> Result<PathBuf> {
    if is_network_locator(locator) {
        anyhow::bail!("network media is not supported: {locator}");
    }
    let trimmed = locator.strip_prefix("file://").unwrap_or(locator);
    Ok(PathBuf::from(trimmed))
}

fn open_source(path: &Path) -> Result<impl Source + Send + 'static> {
    let file =
        File::open(path).with_context(|| format!("failed to open track {}", path.display()))?;
    Decoder::try_from(file).with_context(|| format!("failed to decode {}", path.display()))
}

pub struct RodioMediaResource {
    stream: OutputStream,
    sink: Sink,
    current: Option<PathBuf>,
    track_duration: Option<Duration>,
    volume: f32,
    metadata_pending: bool,
    ended_reported: bool,
}

impl RodioMediaResource {
    pub fn new() -> Result<Self> {
        let stream = Self::open_output_stream()?;
        let sink = Sink::connect_new(stream.mixer());
        sink.pause();

        Ok(Self {
            stream,
            sink,
            current: None,
            track_duration: None,
            volume: 1.0,
            metadata_pending: false,
            ended_reported: false,
        })
    }

    fn open_output_stream() -> Result<OutputStream> {
        let mut stream = with_silenced_stderr(|| {
            let host = rodio::cpal::default_host();
            match OutputStreamBuilder::from_default_device()
                .context("failed to open default system output stream")
                .and_then(|builder| {
                    builder
                        .with_error_callback(|_| {})
                        .open_stream_or_fallback()
                        .context("failed to start default output stream")
                }) {
                Ok(stream) => Ok(stream),
                Err(default_err) => {
                    let mut candidates: Vec<String> = host
                        .output_devices()
                        .ok()
                        .into_iter()
                        .flatten()
                        .filter_map(|device| device.name().ok())
                        .collect();
                    candidates.sort_by_cached_key(|name| {
                        let lower = name.to_ascii_lowercase();
                        let rank = if lower.contains("pulse") {
                            0_u8
                        } else if lower.contains("pipewire") {
                            1_u8
                        } else if lower.contains("default") {
                            2_u8
                        } else {
                            3_u8
                        };
                        (rank, lower)
                    });
                    candidates.dedup();

                    let mut started: Option<OutputStream> = None;
                    for candidate in candidates {
                        let Some(device) = host.output_devices().ok().into_iter().flatten().find(
                            |entry| entry.name().ok().as_deref() == Some(candidate.as_str()),
                        ) else {
                            continue;
                        };
                        let opened = OutputStreamBuilder::from_device(device)
                            .context("failed to open fallback output device")
                            .and_then(|builder| {
                                builder
                                    .with_error_callback(|_| {})
                                    .open_stream_or_fallback()
                                    .context("failed to start fallback output stream")
                            });
                        if let Ok(stream) = opened {
                            tracing::info!(device = %candidate, "using fallback output device");
                            started = Some(stream);
                            break;
                        }
                    }

                    started.with_context(|| {
                        format!(
                            "unable to start any audio output stream after default failed: {default_err:#}"
                        )
                    })
                }
            }
        })?;
        stream.log_on_drop(false);
        Ok(stream)
    }
}

impl MediaResource for RodioMediaResource {
    fn load(&mut self, locator: &str) -> Result<()> {
        self.sink.stop();
        self.sink = Sink::connect_new(self.stream.mixer());
        self.sink.pause();
        self.sink.set_volume(self.volume);
        self.current = None;
        self.track_duration = None;
        self.metadata_pending = false;
        self.ended_reported = false;

        let path = local_path(locator)?;
        let source = open_source(&path)?;
        self.track_duration = source.total_duration().filter(|d| !d.is_zero());
        self.sink.append(source);
        self.current = Some(path);
        self.metadata_pending = true;
        tracing::debug!(locator, duration = ?self.track_duration, "source loaded");
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.current.is_none() {
            anyhow::bail!("no source loaded");
        }
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn set_position(&mut self, position: Duration) -> Result<()> {
        if self.current.is_none() {
            anyhow::bail!("no source loaded");
        }

        let finished = self.sink.empty();
        if finished {
            // Drained sinks cannot seek; reopen the same source.
            let path = self.current.clone().context("no source loaded")?;
            let was_paused = self.sink.is_paused();
            self.sink = Sink::connect_new(self.stream.mixer());
            self.sink.pause();
            self.sink.set_volume(self.volume);
            self.sink.append(open_source(&path)?);
            if !was_paused {
                self.sink.play();
            }
        }

        self.sink
            .try_seek(position)
            .map_err(|err| anyhow::anyhow!("failed to seek current track: {err:?}"))?;
        self.ended_reported = false;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn current_position(&self) -> Option<Duration> {
        self.current.as_ref()?;
        Some(self.sink.get_pos())
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        if self.current.is_none() {
            return events;
        }

        if self.metadata_pending {
            self.metadata_pending = false;
            events.push(MediaEvent::MetadataReady(self.track_duration));
        }

        if !self.sink.is_paused() {
            events.push(MediaEvent::PositionAdvanced(self.sink.get_pos()));
        }

        if !self.ended_reported && !self.sink.is_paused() && self.sink.empty() {
            self.ended_reported = true;
            events.push(MediaEvent::Ended);
        }

        events
    }

    fn output_name(&self) -> String {
        String::from("System default output (CPAL)")
    }
}

#[cfg(unix)]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved < 0 {
        return operation();
    }

    let devnull = CString::new("/dev/null")
        .ok()
        .map(|path| unsafe { libc::open(path.as_ptr(), libc::O_WRONLY) })
        .unwrap_or(-1);

    if devnull >= 0 {
        unsafe {
            libc::dup2(devnull, libc::STDERR_FILENO);
            libc::close(devnull);
        }
    }

    let result = operation();

    unsafe {
        libc::dup2(saved, libc::STDERR_FILENO);
        libc::close(saved);
    }

    result
}

#[cfg(not(unix))]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    operation()
}

/// Logical-clock stand-in used when no output device can be opened.
pub struct NullMediaResource {
    paused: bool,
    current: Option<String>,
    volume: f32,
    started_at: Option<Instant>,
    position_offset: Duration,
    track_duration: Option<Duration>,
    metadata_pending: bool,
    ended_reported: bool,
}

impl NullMediaResource {
    pub fn new() -> Self {
        Self {
            paused: true,
            current: None,
            volume: 1.0,
            started_at: None,
            position_offset: Duration::ZERO,
            track_duration: None,
            metadata_pending: false,
            ended_reported: false,
        }
    }

    pub fn current_locator(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn estimate_duration(locator: &str) -> Option<Duration> {
        let path = local_path(locator).ok()?;
        let source = open_source(&path).ok()?;
        source
            .total_duration()
            .filter(|duration| !duration.is_zero())
    }

    fn position_now(&self) -> Duration {
        let mut position = self.position_offset;
        if !self.paused
            && self.current.is_some()
            && let Some(started_at) = self.started_at
        {
            position = position.saturating_add(started_at.elapsed());
        }
        if let Some(duration) = self.track_duration {
            return position.min(duration);
        }
        position
    }

    fn is_finished(&self) -> bool {
        let Some(duration) = self.track_duration else {
            return false;
        };
        self.current.is_some() && !self.paused && self.position_now() >= duration
    }
}

impl Default for NullMediaResource {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaResource for NullMediaResource {
    fn load(&mut self, locator: &str) -> Result<()> {
        self.paused = true;
        self.current = Some(locator.to_string());
        self.started_at = None;
        self.position_offset = Duration::ZERO;
        self.track_duration = Self::estimate_duration(locator);
        self.metadata_pending = true;
        self.ended_reported = false;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.current.is_none() {
            anyhow::bail!("no source loaded");
        }
        if self.paused {
            self.started_at = Some(Instant::now());
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.position_offset = self.position_now();
        self.started_at = None;
        self.paused = true;
    }

    fn set_position(&mut self, position: Duration) -> Result<()> {
        if self.current.is_none() {
            anyhow::bail!("no source loaded");
        }

        self.position_offset = self
            .track_duration
            .map_or(position, |duration| position.min(duration));
        self.started_at = if self.paused {
            None
        } else {
            Some(Instant::now())
        };
        self.ended_reported = false;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn current_position(&self) -> Option<Duration> {
        self.current.as_ref()?;
        Some(self.position_now())
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        if self.current.is_none() {
            return events;
        }

        if self.metadata_pending {
            self.metadata_pending = false;
            events.push(MediaEvent::MetadataReady(self.track_duration));
        }

        if !self.paused {
            events.push(MediaEvent::PositionAdvanced(self.position_now()));
        }

        if !self.ended_reported && self.is_finished() {
            self.ended_reported = true;
            events.push(MediaEvent::Ended);
        }

        events
    }

    fn output_name(&self) -> String {
        String::from("Null audio output")
    }
}
