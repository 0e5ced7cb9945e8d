//! Track ordering under the shuffle flag.
//!
//! Everything here is a pure function of the playback state and the catalog
//! length; the controller decides when to apply the result.

use crate::model::PlaybackState;
use rand::Rng;
use rand::seq::SliceRandom;

pub fn next_index(state: &PlaybackState, catalog_len: usize) -> usize {
    if catalog_len == 0 {
        return 0;
    }

    if state.shuffle_enabled && !state.shuffle_order.is_empty() {
        let order = &state.shuffle_order;
        let pos = shuffle_position(order, state.current_index);
        return order[(pos + 1) % order.len()];
    }

    (state.current_index + 1) % catalog_len
}

pub fn prev_index(state: &PlaybackState, catalog_len: usize) -> usize {
    if catalog_len == 0 {
        return 0;
    }

    if state.shuffle_enabled && !state.shuffle_order.is_empty() {
        let order = &state.shuffle_order;
        let pos = shuffle_position(order, state.current_index);
        return order[(pos + order.len() - 1) % order.len()];
    }

    (state.current_index % catalog_len + catalog_len - 1) % catalog_len
}

/// Builds a random play order over `0..catalog_len` that starts with `current`,
/// so turning shuffle on never interrupts the track that is already playing.
pub fn enable_shuffle<R: Rng + ?Sized>(current: usize, catalog_len: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..catalog_len).collect();
    order.shuffle(rng);

    if let Some(pos) = order.iter().position(|idx| *idx == current) {
        order.remove(pos);
        order.insert(0, current);
    }
    order
}

pub fn disable_shuffle() -> Vec<usize> {
    Vec::new()
}

// A current index missing from the order is treated as sitting at the front.
fn shuffle_position(order: &[usize], current: usize) -> usize {
    order.iter().position(|idx| *idx == current).unwrap_or(0)
}
