//! Process-wide concurrency and pacing control.
//!
//! One governor is shared by every probe in a session, including retries
//! and batch scans. It enforces two independent limits: at most
//! `max_concurrency` attempts in flight, and at least
//! `inter_request_delay_ms` between any two dispatches.

use handlescan_core::ScanConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::trace;

/// Shared admission control for probe attempts.
#[derive(Debug)]
pub struct Governor {
    slots: Arc<Semaphore>,
    dispatch_spacing: Duration,
    next_dispatch: Mutex<Option<Instant>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

/// Held for the duration of one attempt; releasing it frees the slot.
#[derive(Debug)]
pub struct AdmissionSlot {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for AdmissionSlot {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Governor {
    /// Build a governor from the configured limits.
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(config.max_concurrency)),
            dispatch_spacing: Duration::from_millis(config.inter_request_delay_ms),
            next_dispatch: Mutex::new(None),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait for a free slot and for the pacing window, then admit one
    /// attempt. The returned slot must be held until the attempt resolves.
    pub async fn admit(&self) -> AdmissionSlot {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .expect("governor semaphore closed");

        if !self.dispatch_spacing.is_zero() {
            let scheduled = {
                let mut next = self.next_dispatch.lock().expect("acquire pacing lock");
                let now = Instant::now();
                let slot = match *next {
                    Some(at) if at > now => at,
                    _ => now,
                };
                *next = Some(slot + self.dispatch_spacing);
                slot
            };
            tokio::time::sleep_until(scheduled).await;
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        trace!(in_flight = current, "attempt admitted");

        AdmissionSlot {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Attempts currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest in-flight count observed since construction.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}
