//! Boundary to the external summary reporter.
//!
//! The engine never renders prose itself. A [`SummaryRenderer`] turns the
//! payload into text and must contain its own failures, returning `None`
//! instead of erroring.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::clock::Clock;
use crate::format::format_stats;
use crate::payload::RunPayload;

/// Turns a run payload into human-readable text.
pub trait SummaryRenderer: Send + Sync {
    /// Rendered summary, or `None` on any failure.
    fn render(&self, payload: &RunPayload) -> Option<String>;
}

impl<R: SummaryRenderer + ?Sized> SummaryRenderer for Box<R> {
    fn render(&self, payload: &RunPayload) -> Option<String> {
        (**self).render(payload)
    }
}

/// Rate-limits an inner renderer using an injected clock.
///
/// Calls made within `min_interval` of the last admitted call return `None`
/// without reaching the inner renderer.
pub struct ThrottledRenderer<R, C> {
    inner: R,
    clock: C,
    min_interval: Duration,
    last_call: Mutex<Option<DateTime<Utc>>>,
}

impl<R: SummaryRenderer, C: Clock> ThrottledRenderer<R, C> {
    pub fn new(inner: R, clock: C, min_interval: Duration) -> Self {
        Self {
            inner,
            clock,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Admit a call now, recording it, or refuse it.
    fn admit(&self) -> bool {
        let now = self.clock.now();
        let mut last_call = self.last_call.lock().unwrap_or_else(|e| e.into_inner());
        if last_call.is_some_and(|last| now - last < self.min_interval) {
            return false;
        }
        *last_call = Some(now);
        true
    }
}

impl<R: SummaryRenderer, C: Clock> SummaryRenderer for ThrottledRenderer<R, C> {
    fn render(&self, payload: &RunPayload) -> Option<String> {
        if !self.admit() {
            debug!(run_id = %payload.run_id, "Summary render rate-limited");
            return None;
        }
        self.inner.render(payload)
    }
}

/// Renderer output if there is any, else the deterministic stats text.
pub fn summarize(renderer: Option<&dyn SummaryRenderer>, payload: &RunPayload) -> String {
    renderer
        .and_then(|r| r.render(payload))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| format_stats(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::engine::EvictionMode;
    use crate::payload::{ActionsPayload, DiskPayload, TimingPayload, TypeCounts};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingRenderer {
        calls: AtomicUsize,
        reply: Option<&'static str>,
    }

    impl SummaryRenderer for CountingRenderer {
        fn render(&self, _payload: &RunPayload) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.map(str::to_string)
        }
    }

    fn payload() -> RunPayload {
        RunPayload {
            mode: EvictionMode::Retention,
            server: "catcord".to_string(),
            run_id: "run".to_string(),
            disk: DiskPayload {
                percent_before: 40.0,
                percent_after: 40.0,
                pressure_threshold: 85.0,
                emergency_threshold: 92.0,
            },
            actions: ActionsPayload {
                deleted_count: 0,
                freed_gb: 0.0,
                deleted_by_type: TypeCounts {
                    images: 0,
                    non_images: 0,
                },
            },
            candidates_count: 0,
            total_files_count: 0,
            timing: TimingPayload {
                duration_seconds: 0.0,
            },
        }
    }

    #[test]
    fn test_throttle_gates_on_injected_clock() {
        let clock = Arc::new(ManualClock::default());
        let throttled = ThrottledRenderer::new(
            CountingRenderer {
                calls: AtomicUsize::new(0),
                reply: Some("ok"),
            },
            Arc::clone(&clock),
            Duration::seconds(60),
        );

        assert_eq!(throttled.render(&payload()).as_deref(), Some("ok"));
        assert_eq!(throttled.render(&payload()), None);

        clock.advance(Duration::seconds(59));
        assert_eq!(throttled.render(&payload()), None);

        clock.advance(Duration::seconds(1));
        assert_eq!(throttled.render(&payload()).as_deref(), Some("ok"));
        assert_eq!(throttled.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_summarize_falls_back_to_stats() {
        let silent = CountingRenderer {
            calls: AtomicUsize::new(0),
            reply: None,
        };
        let text = summarize(Some(&silent as &dyn SummaryRenderer), &payload());
        assert!(text.starts_with("mode: retention"));

        let text = summarize(None, &payload());
        assert!(text.contains("deleted_count: 0"));
    }

    #[test]
    fn test_summarize_prefers_renderer() {
        let renderer = CountingRenderer {
            calls: AtomicUsize::new(0),
            reply: Some("  Disk usage: 40.0% (threshold 85.0%). No deletions. Freed: 0.0 GB.\n"),
        };
        assert_eq!(
            summarize(Some(&renderer as &dyn SummaryRenderer), &payload()),
            "Disk usage: 40.0% (threshold 85.0%). No deletions. Freed: 0.0 GB."
        );
    }
}
