//! Applies visibility decisions to a rendered pane.
//!
//! The driver is the only part of the belief engine with side effects: it
//! shows or hides its pane on every evaluation and, when a pane appears as a
//! result of something the visitor did, scrolls it into view after a short
//! delay. A later visibility change cancels a scroll that has not fired yet.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::matcher::is_visible;
use crate::types::{BeliefSet, PaneFilters};

/// Inline styles for a shown pane.
pub const VISIBLE_STYLE: &[(&str, &str)] = &[
    ("opacity", "1"),
    ("height", "auto"),
    ("overflow", "visible"),
    ("clip-path", "none"),
    ("margin", ""),
];

/// Inline styles for a hidden pane. Collapsed, not removed from layout flow.
pub const COLLAPSED_STYLE: &[(&str, &str)] = &[
    ("opacity", "0"),
    ("height", "0"),
    ("overflow", "hidden"),
    ("clip-path", "inset(50%)"),
    ("margin", "0"),
];

/// A rendered pane the driver controls.
pub trait PaneSurface: Send + 'static {
    /// Apply [`VISIBLE_STYLE`].
    fn show(&mut self);
    /// Apply [`COLLAPSED_STYLE`] and drop any entrance animation.
    fn hide(&mut self);
    /// Scroll the pane into view and play its entrance animation.
    fn scroll_into_view(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverTiming {
    /// No scrolling until this long after page load.
    pub settle: Duration,
    /// Delay between a pane appearing and the scroll.
    pub scroll_delay: Duration,
}

impl DriverTiming {
    pub fn from_millis(settle_ms: u64, scroll_delay_ms: u64) -> Self {
        Self {
            settle: Duration::from_millis(settle_ms),
            scroll_delay: Duration::from_millis(scroll_delay_ms),
        }
    }
}

impl Default for DriverTiming {
    fn default() -> Self {
        Self::from_millis(5000, 50)
    }
}

pub struct VisibilityDriver<S: PaneSurface> {
    pane_id: String,
    filters: PaneFilters,
    surface: Arc<Mutex<S>>,
    timing: DriverTiming,
    loaded_at: Instant,
    visible: Option<bool>,
    pending_scroll: Option<JoinHandle<()>>,
}

impl<S: PaneSurface> VisibilityDriver<S> {
    pub fn new(pane_id: impl Into<String>, filters: PaneFilters, surface: S, timing: DriverTiming) -> Self {
        Self {
            pane_id: pane_id.into(),
            filters,
            surface: Arc::new(Mutex::new(surface)),
            timing,
            loaded_at: Instant::now(),
            visible: None,
            pending_scroll: None,
        }
    }

    pub fn pane_id(&self) -> &str {
        &self.pane_id
    }

    pub fn surface(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.surface)
    }

    /// Visibility from the latest evaluation, if any.
    pub fn is_visible(&self) -> Option<bool> {
        self.visible
    }

    /// Restart the settle window, e.g. after client-side navigation.
    pub fn page_loaded(&mut self) {
        self.loaded_at = Instant::now();
    }

    pub async fn evaluate(&mut self, beliefs: &BeliefSet) -> bool {
        let visible = is_visible(self.filters.held.as_ref(), self.filters.withheld.as_ref(), beliefs);
        let previous = self.visible.replace(visible);
        if previous != Some(visible) {
            if let Some(handle) = self.pending_scroll.take() {
                handle.abort();
            }
        }

        {
            let mut surface = self.surface.lock().await;
            if visible {
                surface.show();
            } else {
                surface.hide();
            }
        }

        let settled = self.loaded_at.elapsed() >= self.timing.settle;
        if visible && previous == Some(false) && settled {
            debug!(pane = %self.pane_id, "[Beliefs] Pane revealed; scheduling scroll");
            let surface = Arc::clone(&self.surface);
            let delay = self.timing.scroll_delay;
            self.pending_scroll = Some(tokio::spawn(async move {
                sleep(delay).await;
                surface.lock().await.scroll_into_view();
            }));
        }
        visible
    }
}

impl<S: PaneSurface> Drop for VisibilityDriver<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending_scroll.take() {
            handle.abort();
        }
    }
}

/// Re-evaluate a pane every time the belief set changes. The task ends when
/// the store is dropped.
pub fn watch_pane<S: PaneSurface>(
    mut driver: VisibilityDriver<S>,
    mut beliefs: watch::Receiver<BeliefSet>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let snapshot = beliefs.borrow_and_update().clone();
            driver.evaluate(&snapshot).await;
            if beliefs.changed().await.is_err() {
                debug!(pane = %driver.pane_id(), "[Beliefs] Store closed; pane watcher exiting");
                break;
            }
        }
    })
}
