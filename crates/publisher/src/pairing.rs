//! Stereo pair correlation on the consumer side.
//!
//! Cameras are not ordered relative to each other, so the left and right
//! images of one trigger arrive in any order. Both carry the camera update
//! time as their stamp; `StereoPairer` matches them by stamp.
//!
//! Pending images live in a fixed-size ring buffer per role. Per camera the
//! stamps are non-decreasing, so an opposite-side image older than
//! `stamp - tolerance` can never be matched and is evicted.

use std::fmt;

use contracts::{CameraRole, ImageMessage, SimTime};
use ringbuf::{traits::*, HeapRb};
use tracing::{debug, trace};

/// A matched reference/secondary image pair
#[derive(Debug, Clone)]
pub struct StereoPair {
    pub reference: ImageMessage,
    pub secondary: ImageMessage,
}

impl StereoPair {
    /// Reference stamp minus secondary stamp, in milliseconds
    pub fn skew_ms(&self) -> f64 {
        (self.reference.header.stamp - self.secondary.header.stamp) * 1000.0
    }

    pub fn stamp(&self) -> SimTime {
        self.reference.header.stamp
    }
}

/// Matches reference and secondary images by stamp
pub struct StereoPairer {
    reference: HeapRb<ImageMessage>,
    secondary: HeapRb<ImageMessage>,
    tolerance: SimTime,
    matched: u64,
    unmatched: u64,
}

impl fmt::Debug for StereoPairer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StereoPairer")
            .field("pending_reference", &self.reference.occupied_len())
            .field("pending_secondary", &self.secondary.occupied_len())
            .field("tolerance", &self.tolerance)
            .field("matched", &self.matched)
            .field("unmatched", &self.unmatched)
            .finish()
    }
}

impl StereoPairer {
    /// `capacity` pending images per side, `tolerance` in seconds
    pub fn new(capacity: usize, tolerance: SimTime) -> Self {
        let capacity = capacity.max(1);
        Self {
            reference: HeapRb::new(capacity),
            secondary: HeapRb::new(capacity),
            tolerance: tolerance.abs(),
            matched: 0,
            unmatched: 0,
        }
    }

    /// Offer an image. Returns a pair when it completes one.
    ///
    /// Images without a role are not paired.
    pub fn push(&mut self, image: ImageMessage) -> Option<StereoPair> {
        let role = image.role?;
        let stamp = image.header.stamp;
        let tolerance = self.tolerance;

        let (own, other) = match role {
            CameraRole::Reference => (&mut self.reference, &mut self.secondary),
            CameraRole::Secondary => (&mut self.secondary, &mut self.reference),
        };

        self.unmatched += evict_older_than(other, stamp - tolerance);

        if let Some(partner) = take_match(other, stamp, tolerance) {
            self.matched += 1;
            let pair = match role {
                CameraRole::Reference => StereoPair {
                    reference: image,
                    secondary: partner,
                },
                CameraRole::Secondary => StereoPair {
                    reference: partner,
                    secondary: image,
                },
            };
            observability::record_pair_skew_ms(pair.skew_ms());
            trace!(stamp = pair.stamp(), skew_ms = pair.skew_ms(), "stereo pair matched");
            return Some(pair);
        }

        if own.is_full() {
            if let Some(oldest) = own.try_pop() {
                self.unmatched += 1;
                debug!(
                    camera = %oldest.camera,
                    stamp = oldest.header.stamp,
                    "pending image evicted unmatched"
                );
            }
        }
        let _ = own.try_push(image);
        None
    }

    pub fn pending(&self) -> usize {
        self.reference.occupied_len() + self.secondary.occupied_len()
    }

    pub fn matched(&self) -> u64 {
        self.matched
    }

    /// Images dropped without a partner
    pub fn unmatched(&self) -> u64 {
        self.unmatched
    }
}

fn evict_older_than(buffer: &mut HeapRb<ImageMessage>, cutoff: SimTime) -> u64 {
    let mut evicted = 0;
    while buffer
        .iter()
        .next()
        .is_some_and(|oldest| oldest.header.stamp < cutoff)
    {
        let _ = buffer.try_pop();
        evicted += 1;
    }
    evicted
}

/// Remove and return the closest pending image within tolerance
fn take_match(
    buffer: &mut HeapRb<ImageMessage>,
    stamp: SimTime,
    tolerance: SimTime,
) -> Option<ImageMessage> {
    let (index, _) = buffer
        .iter()
        .enumerate()
        .map(|(i, m)| (i, (m.header.stamp - stamp).abs()))
        .filter(|&(_, diff)| diff <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    // Rebuild the buffer without the match; only a handful of entries.
    let mut pending: Vec<ImageMessage> = buffer.pop_iter().collect();
    let found = pending.remove(index);
    for message in pending {
        let _ = buffer.try_push(message);
    }
    Some(found)
}
