//! Scroll-position observation feeding the paginator.
//!
//! The engine does not own a viewport; whatever surface hosts it publishes
//! [`ScrollMetrics`] observations into a channel, and a background task
//! turns near-bottom positions into incremental loads. The task holds only
//! a weak reference to the engine, so it stops as soon as every handle is
//! dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::Paginator;

/// One observation of the scrollable viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Offset of the viewport top from the content top, in pixels.
    pub scroll_top: f64,
    /// Visible viewport height, in pixels.
    pub viewport_height: f64,
    /// Full scrollable content height, in pixels.
    pub content_height: f64,
}

impl ScrollMetrics {
    /// Remaining distance from the viewport bottom to the content bottom.
    pub fn distance_to_bottom(&self) -> f64 {
        (self.content_height - (self.scroll_top + self.viewport_height)).max(0.0)
    }
}

impl<T: Send + 'static> Paginator<T> {
    /// Consume scroll observations until the channel closes or the engine
    /// is torn down.
    pub fn spawn_scroll_observer(
        &self,
        mut positions: mpsc::Receiver<ScrollMetrics>,
    ) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while let Some(metrics) = positions.recv().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                Paginator { inner }.observe_scroll(metrics).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_bottom_basic() {
        let metrics = ScrollMetrics {
            scroll_top: 500.0,
            viewport_height: 800.0,
            content_height: 2000.0,
        };
        assert_eq!(metrics.distance_to_bottom(), 700.0);
    }

    #[test]
    fn distance_to_bottom_clamps_overscroll() {
        let metrics = ScrollMetrics {
            scroll_top: 1300.0,
            viewport_height: 800.0,
            content_height: 2000.0,
        };
        assert_eq!(metrics.distance_to_bottom(), 0.0);
    }
}
