//! Circular next/previous selection over a play order.

use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Move one step from `pos` within an order of `len` entries, wrapping at
/// both ends.
///
/// Returns `None` for an empty order. When there is no current position the
/// walk enters the order at position 0 regardless of direction.
pub fn step(len: usize, pos: Option<usize>, direction: Direction) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let next = match (pos, direction) {
        (None, _) => 0,
        (Some(p), Direction::Next) => (p + 1) % len,
        (Some(p), Direction::Previous) => (p % len + len - 1) % len,
    };
    Some(next)
}

/// Playlist order: `0..len`.
pub(super) fn identity_order(len: usize) -> Vec<usize> {
    (0..len).collect()
}

/// Random permutation of `0..len`. When `first` is given it is moved to the
/// front so the current track stays put and everything after it is random.
pub(super) fn shuffled_order<R: Rng + ?Sized>(
    len: usize,
    first: Option<usize>,
    rng: &mut R,
) -> Vec<usize> {
    let mut order = identity_order(len);
    order.shuffle(rng);
    if let Some(first) = first {
        if let Some(pos) = order.iter().position(|&i| i == first) {
            order.swap(0, pos);
        }
    }
    order
}
