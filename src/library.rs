use crate::audio::is_network_locator;
use crate::model::{Catalog, Track};
use anyhow::{Context, Result};
use lofty::prelude::{Accessor, TaggedFileExt};
use lofty::probe::Probe;
use serde::Deserialize;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::get_probe;
use walkdir::WalkDir;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "ogg", "m4a", "aac", "opus"];
const ARTWORK_STEMS: &[&str] = &["cover", "folder", "front", "album"];
const ARTWORK_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const UNKNOWN_ARTIST: &str = "Unknown artist";

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Bare(Vec<Track>),
    Wrapped { tracks: Vec<Track> },
}

/// Reads a JSON catalog. Relative locators are taken relative to the file.
pub fn load_catalog_file(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let parsed: CatalogFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;
    let mut tracks = match parsed {
        CatalogFile::Bare(tracks) | CatalogFile::Wrapped { tracks } => tracks,
    };

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for track in &mut tracks {
        track.media = resolve_locator(base, &track.media);
        track.artwork = track
            .artwork
            .take()
            .filter(|locator| !locator.trim().is_empty())
            .map(|locator| resolve_locator(base, &locator));
    }

    Catalog::new(tracks).with_context(|| format!("catalog {} has no tracks", path.display()))
}

pub fn resolve_locator(base: &Path, locator: &str) -> String {
    let trimmed = locator.trim();
    if is_network_locator(trimmed) || trimmed.starts_with("file://") {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() || base.as_os_str().is_empty() {
        return trimmed.to_string();
    }
    base.join(path).to_string_lossy().into_owned()
}

pub fn scan_folder(root: &Path) -> Vec<Track> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_audio(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    found.sort();

    found
        .into_iter()
        .map(|path| {
            let (title, artist) = read_tags(&path);
            let title = title.unwrap_or_else(|| {
                path.file_stem()
                    .and_then(OsStr::to_str)
                    .unwrap_or("unknown")
                    .to_string()
            });
            Track {
                title,
                artist: artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
                media: path.to_string_lossy().into_owned(),
                artwork: sibling_artwork(&path),
            }
        })
        .collect()
}

pub fn scan_many(roots: &[PathBuf]) -> Vec<Track> {
    let mut all = Vec::new();
    for root in roots {
        all.extend(scan_folder(root));
    }
    all.sort_by(|a, b| a.media.cmp(&b.media));
    all.dedup_by(|a, b| a.media == b.media);
    all
}

fn read_tags(path: &Path) -> (Option<String>, Option<String>) {
    let tagged = match Probe::open(path).and_then(|probe| probe.read()) {
        Ok(tagged) => tagged,
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "no readable tags");
            return (None, None);
        }
    };
    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return (None, None);
    };

    let title = tag.title().and_then(|value| clean_tag_value(&value));
    let artist = tag.artist().and_then(|value| clean_tag_value(&value));
    (title, artist)
}

fn clean_tag_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn sibling_artwork(track: &Path) -> Option<String> {
    let dir = track.parent()?;
    ARTWORK_STEMS.iter().find_map(|stem| {
        ARTWORK_EXTENSIONS.iter().find_map(|ext| {
            let candidate = dir.join(format!("{stem}.{ext}"));
            candidate
                .is_file()
                .then(|| candidate.to_string_lossy().into_owned())
        })
    })
}

/// Reads a track's length without decoding it; `None` when the locator is
/// remote, missing or not a container symphonia understands.
pub fn probe_duration(locator: &str) -> Option<Duration> {
    if is_network_locator(locator) {
        return None;
    }
    let path = Path::new(locator.strip_prefix("file://").unwrap_or(locator));
    let file = File::open(path).ok()?;
    let source = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(OsStr::to_str) {
        hint.with_extension(extension);
    }

    let probed = get_probe()
        .format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .ok()?;

    probed
        .format
        .default_track()
        .and_then(|track| codec_duration(&track.codec_params))
}

fn codec_duration(codec_params: &symphonia::core::codecs::CodecParameters) -> Option<Duration> {
    if let (Some(time_base), Some(frame_count)) = (codec_params.time_base, codec_params.n_frames) {
        let time = time_base.calc_time(frame_count);
        return Some(Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac));
    }

    codec_params
        .n_frames
        .zip(codec_params.sample_rate)
        .filter(|(_, sample_rate)| *sample_rate > 0)
        .map(|(frames, sample_rate)| Duration::from_secs_f64(frames as f64 / sample_rate as f64))
}

pub fn probe_durations(catalog: &Catalog) -> Vec<Option<Duration>> {
    catalog
        .tracks()
        .iter()
        .map(|track| {
            let duration = probe_duration(&track.media);
            if duration.is_none() {
                tracing::warn!(title = %track.title, media = %track.media, "duration unavailable");
            }
            duration
        })
        .collect()
}

fn is_audio(path: &Path) -> bool {
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or_default();
    AUDIO_EXTENSIONS
        .iter()
        .any(|supported| ext.eq_ignore_ascii_case(supported))
}
