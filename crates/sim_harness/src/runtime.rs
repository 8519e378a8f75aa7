//! Mock messaging runtime

use std::sync::atomic::{AtomicBool, Ordering};

use contracts::MiddlewareRuntime;

/// Runtime handle with a settable readiness flag
#[derive(Debug, Default)]
pub struct MockRuntime {
    initialized: AtomicBool,
}

impl MockRuntime {
    pub fn new(initialized: bool) -> Self {
        Self {
            initialized: AtomicBool::new(initialized),
        }
    }

    pub fn set_initialized(&self, initialized: bool) {
        self.initialized.store(initialized, Ordering::SeqCst);
    }
}

impl MiddlewareRuntime for MockRuntime {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}
