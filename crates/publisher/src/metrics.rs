//! Publish counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single publisher
#[derive(Debug, Default)]
pub struct PublishMetrics {
    images: AtomicU64,
    camera_infos: AtomicU64,
    /// Messages dropped because the queue was full
    dropped: AtomicU64,
    /// Messages discarded because the consumer went away
    closed: AtomicU64,
}

impl PublishMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_image(&self) {
        self.images.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_camera_info(&self) {
        self.camera_infos.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_closed(&self) {
        self.closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn images(&self) -> u64 {
        self.images.load(Ordering::Relaxed)
    }

    pub fn camera_infos(&self) -> u64 {
        self.camera_infos.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn closed(&self) -> u64 {
        self.closed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> PublishSnapshot {
        PublishSnapshot {
            images: self.images(),
            camera_infos: self.camera_infos(),
            dropped: self.dropped(),
            closed: self.closed(),
        }
    }
}

/// Snapshot of publish counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSnapshot {
    pub images: u64,
    pub camera_infos: u64,
    pub dropped: u64,
    pub closed: u64,
}
