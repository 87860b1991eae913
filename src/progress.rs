//! Progress plumbing: the shared page counter, the renderer callback trait,
//! and the throttling rules.
//!
//! ## The single-writer/single-reader contract
//!
//! During rendering exactly two parties touch [`ProgressState`]: the
//! rendering worker writes the page counter, and the reporter loop in
//! [`crate::job`] reads it on a timer. With one producer and one consumer,
//! all that is needed is memory visibility — atomics, never a mutex. The
//! renderer must not read its own counter back for decisions, and nothing
//! else may write it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared (pages_done, pages_total) cell between renderer and reporter.
///
/// `total` is written once when the document is opened; `done` advances
/// monotonically as pages complete.
#[derive(Debug, Default)]
pub struct ProgressState {
    done: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Writer side: record the document page count, known after opening.
    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Release);
    }

    /// Writer side: record that `done` pages have been completed.
    pub fn record(&self, done: usize) {
        self.done.store(done, Ordering::Release);
    }

    /// Reader side: one consistent-enough snapshot of (done, total).
    ///
    /// The two loads are not atomic together; since `done` only grows and
    /// `total` is written once before any page completes, a torn read can
    /// only under-report progress, which the next poll corrects.
    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.done.load(Ordering::Acquire),
            self.total.load(Ordering::Acquire),
        )
    }
}

/// Called by the renderer as pages complete.
///
/// Invocations follow the cadence rule (see [`is_report_point`]): every
/// `cadence` pages plus a final call at the last page. Implementations must
/// be `Send + Sync`; calls come from the blocking render worker, never
/// concurrently.
pub trait RenderProgress: Send + Sync {
    /// Called once after the document is opened, before any page renders.
    fn on_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called at cadence boundaries and at the final page.
    fn on_page(&self, pages_done: usize, total_pages: usize) {
        let _ = (pages_done, total_pages);
    }
}

/// Whether the renderer should fire its progress callback at `page`.
///
/// True every `cadence` pages and always at the final page, so a 120-page
/// document with the default cadence of 50 reports at 50, 100 and 120.
pub(crate) fn is_report_point(page: usize, total_pages: usize, cadence: usize) -> bool {
    page % cadence == 0 || page == total_pages
}

/// Whether the reporter should emit a notification to the delivery channel.
///
/// Notifications are throttled to once per `cadence` pages of new progress;
/// the forced final notification after rendering completes is handled by the
/// job loop, not here.
pub(crate) fn should_notify(pages_done: usize, last_notified: usize, cadence: usize) -> bool {
    pages_done.saturating_sub(last_notified) >= cadence
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_snapshot_sees_writes() {
        let state = ProgressState::new();
        state.set_total(120);
        state.record(50);
        assert_eq!(state.snapshot(), (50, 120));
        state.record(100);
        assert_eq!(state.snapshot(), (100, 120));
    }

    #[test]
    fn report_points_cadence_50_of_120() {
        let points: Vec<usize> = (1..=120)
            .filter(|&p| is_report_point(p, 120, 50))
            .collect();
        assert_eq!(points, vec![50, 100, 120]);
    }

    #[test]
    fn report_points_exact_multiple_total() {
        // Final page coincides with a cadence boundary: fires once, not twice.
        let points: Vec<usize> = (1..=100)
            .filter(|&p| is_report_point(p, 100, 50))
            .collect();
        assert_eq!(points, vec![50, 100]);
    }

    #[test]
    fn report_points_short_document() {
        // Fewer pages than the cadence: only the final page fires.
        let points: Vec<usize> = (1..=7).filter(|&p| is_report_point(p, 7, 50)).collect();
        assert_eq!(points, vec![7]);
    }

    #[test]
    fn notify_requires_full_cadence_of_new_progress() {
        assert!(!should_notify(49, 0, 50));
        assert!(should_notify(50, 0, 50));
        assert!(!should_notify(99, 50, 50));
        assert!(should_notify(100, 50, 50));
        // Progress below the last notification never fires.
        assert!(!should_notify(10, 50, 50));
    }

    struct Recording {
        calls: std::sync::Mutex<Vec<(usize, usize)>>,
    }

    impl RenderProgress for Recording {
        fn on_page(&self, done: usize, total: usize) {
            self.calls.lock().unwrap().push((done, total));
        }
    }

    #[test]
    fn trait_default_methods_are_noops() {
        struct Silent;
        impl RenderProgress for Silent {}
        let s = Silent;
        s.on_start(10);
        s.on_page(5, 10);
    }

    #[test]
    fn recording_progress_receives_calls() {
        let rec = Recording {
            calls: std::sync::Mutex::new(Vec::new()),
        };
        for page in 1..=120 {
            if is_report_point(page, 120, 50) {
                rec.on_page(page, 120);
            }
        }
        assert_eq!(
            *rec.calls.lock().unwrap(),
            vec![(50, 120), (100, 120), (120, 120)]
        );
    }
}
