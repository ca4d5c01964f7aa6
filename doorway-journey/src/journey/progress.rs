//! Scroll progress tracker
//!
//! `progress = 100 * scroll_top / (scroll_height - client_height)`, or 0 when
//! there is nothing to scroll. Recomputed on every scroll notification and
//! once eagerly when the page mounts; no smoothing.

/// Viewport scroll metrics reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }
}

/// Scroll completion as a percentage in `[0, 100]`
pub fn scroll_progress(metrics: ScrollMetrics) -> f64 {
    let scrollable = metrics.scroll_height - metrics.client_height;
    if !(scrollable > 0.0) || !metrics.scroll_top.is_finite() {
        return 0.0;
    }
    // Overscroll (elastic bounce) can report values past either end
    (100.0 * metrics.scroll_top / scrollable).clamp(0.0, 100.0)
}

/// Holds the last computed percentage for the progress bar
#[derive(Debug, Clone, Default)]
pub struct ScrollProgressTracker {
    percent: f64,
}

impl ScrollProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Recompute from fresh metrics; returns the new percentage
    pub fn update(&mut self, metrics: ScrollMetrics) -> f64 {
        self.percent = scroll_progress(metrics);
        self.percent
    }
}
