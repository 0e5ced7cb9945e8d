#![no_main]

use jukebox::audio::NullMediaResource;
use jukebox::controller::{PlaybackController, SeekTarget};
use jukebox::model::{Catalog, Track};
use libfuzzer_sys::fuzz_target;
use std::time::Duration;

fuzz_target!(|data: &[u8]| {
    let len = (data.len() % 32).max(1);
    let tracks = (0..len)
        .map(|idx| Track {
            title: format!("track {idx}"),
            artist: String::from("fuzz"),
            media: format!("track_{idx}.mp3"),
            artwork: None,
        })
        .collect();
    let Ok(catalog) = Catalog::new(tracks) else {
        return;
    };
    let mut player = PlaybackController::with_seed(catalog, NullMediaResource::new(), len as u64);

    for byte in data {
        match byte % 12 {
            0 => player.play(),
            1 => player.pause(),
            2 => player.next(),
            3 => player.previous(),
            4 => {
                player.cycle_repeat_mode();
            }
            5 => {
                player.toggle_shuffle();
            }
            6 => player.on_track_ended(),
            7 => {
                let _ = player.load_track(usize::from(*byte) % (len + 2));
            }
            8 => player.on_metadata_ready(Some(Duration::from_secs(u64::from(*byte)))),
            9 => {
                let _ = player.seek(SeekTarget::Fraction(f64::from(*byte) / 128.0));
            }
            10 => player.set_volume(f32::from(*byte) / 100.0),
            _ => {
                let index = player.state().current_index;
                player.on_load_error(index, String::from("fuzz"));
            }
        }

        let state = player.state();
        assert!(state.current_index < len);
        assert!((0.0..=1.0).contains(&state.volume));
        if state.shuffle_enabled {
            assert_eq!(state.shuffle_order.len(), len);
        }
    }
});
