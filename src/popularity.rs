//! Popularity side channel.
//!
//! Adding a product to the wishlist bumps its popularity counter on the
//! backend. The call runs on a detached task: nothing waits for it and its
//! failure is only logged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::api::CatalogSource;

/// Environment variable to disable non-essential traffic (popularity pings)
pub const DISABLE_TRACKING_ENV: &str = "ANTIQKART_DISABLE_NONESSENTIAL_TRAFFIC";

/// Check if popularity tracking is enabled
pub fn is_tracking_enabled() -> bool {
    match std::env::var(DISABLE_TRACKING_ENV) {
        Ok(val) => {
            let val_lower = val.to_lowercase();
            // Disabled if set to "1", "true", "yes", "on"
            !matches!(val_lower.as_str(), "1" | "true" | "yes" | "on")
        }
        // Enabled by default if env var is not set
        Err(_) => true,
    }
}

#[derive(Default)]
struct Counters {
    sent: AtomicU64,
    failed: AtomicU64,
    pending: AtomicU64,
}

/// Fire-and-forget reporter for wishlist additions
#[derive(Clone)]
pub struct PopularityTracker {
    source: Arc<dyn CatalogSource>,
    enabled: bool,
    counters: Arc<Counters>,
}

impl PopularityTracker {
    /// Create a tracker honouring the opt-out environment variable
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        let enabled = is_tracking_enabled();
        if !enabled {
            debug!("Popularity tracking disabled via {}", DISABLE_TRACKING_ENV);
        }
        Self::with_enabled(source, enabled)
    }

    pub fn with_enabled(source: Arc<dyn CatalogSource>, enabled: bool) -> Self {
        Self {
            source,
            enabled,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Schedule a popularity ping for `product_id`.
    ///
    /// Must be called from within a tokio runtime. The returned handle may be
    /// dropped; the task keeps running detached.
    pub fn notify_added(&self, product_id: &str) -> Option<JoinHandle<()>> {
        if !self.enabled {
            return None;
        }

        let source = Arc::clone(&self.source);
        let counters = Arc::clone(&self.counters);
        let product_id = product_id.to_string();
        counters.pending.fetch_add(1, Ordering::SeqCst);

        Some(tokio::spawn(async move {
            match source.record_popularity(&product_id).await {
                Ok(()) => {
                    counters.sent.fetch_add(1, Ordering::Relaxed);
                    debug!("Recorded popularity for product {}", product_id);
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!("Failed to record popularity for {}: {}", product_id, e);
                }
            }
            counters.pending.fetch_sub(1, Ordering::SeqCst);
        }))
    }

    /// Wait up to `timeout` for scheduled pings to finish.
    ///
    /// Short-lived processes call this before exiting so pings are not cut
    /// off by runtime shutdown. Returns false if some were still running.
    pub async fn settle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.counters.pending.load(Ordering::SeqCst) > 0 {
            if Instant::now() >= deadline {
                debug!("Popularity pings still pending at exit");
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }

    /// Number of pings acknowledged by the backend
    pub fn sent_count(&self) -> u64 {
        self.counters.sent.load(Ordering::Relaxed)
    }

    /// Number of pings that failed (logged and dropped)
    pub fn failed_count(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }
}
