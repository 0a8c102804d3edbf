//! Incremental pagination over server-paged collections.
//!
//! [`Paginator`] accumulates pages from a [`PageSource`] into one growing
//! ordered sequence. Exactly one fetch (initial or incremental) may be in
//! flight per instance, enforced by a guard that is checked and set under
//! one lock before any suspension point.

mod scroll;

pub use scroll::ScrollMetrics;

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::BoxFuture;

/// Server-reported pagination metadata accompanying each page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One server-delivered batch of records plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

/// Collaborator delivering pages of a server-paginated collection.
pub trait PageSource<T>: Send + Sync {
    fn fetch_page(&self, page: u32, page_size: u32) -> BoxFuture<'_, Result<Page<T>, ApiError>>;
}

/// [`PageSource`] built from a plain async closure.
pub struct FnSource<F>(F);

/// Package an async `fn(page, page_size)` as a [`PageSource`].
pub fn source_fn<F>(fetch: F) -> FnSource<F> {
    FnSource(fetch)
}

impl<T, F, Fut> PageSource<T> for FnSource<F>
where
    F: Fn(u32, u32) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, ApiError>> + Send + 'static,
{
    fn fetch_page(&self, page: u32, page_size: u32) -> BoxFuture<'_, Result<Page<T>, ApiError>> {
        Box::pin((self.0)(page, page_size))
    }
}

/// Tuning knobs for one [`Paginator`] instance.
#[derive(Debug, Clone)]
pub struct PaginatorOptions {
    /// Records requested per page.
    pub page_size: u32,
    /// Distance from the bottom of the scrollable content, in pixels,
    /// below which an incremental load is triggered.
    pub scroll_threshold: f64,
}

impl Default for PaginatorOptions {
    fn default() -> Self {
        Self {
            page_size: 20,
            scroll_threshold: 100.0,
        }
    }
}

/// Clone of a paginator's externally visible state.
#[derive(Debug, Clone)]
pub struct PageSnapshot<T> {
    /// Accumulated records, in page-arrival order. Never reordered or
    /// deduplicated by the engine.
    pub items: Vec<T>,
    /// Last successfully fetched zero-based page index.
    pub current_page: u32,
    /// Whether the server reports pages beyond `current_page`.
    pub has_more: bool,
    /// Server-reported total record count, advisory only.
    pub total_count: u64,
    /// Initial/refresh fetch in flight.
    pub is_loading: bool,
    /// Incremental fetch in flight. Never true together with `is_loading`.
    pub is_loading_more: bool,
    /// Message from the most recent failed fetch; cleared by the next
    /// successful one.
    pub error: Option<String>,
}

struct PageState<T> {
    items: Vec<T>,
    current_page: u32,
    has_more: bool,
    total_count: u64,
    is_loading: bool,
    is_loading_more: bool,
    error: Option<String>,
    /// Non-reentrant guard, independent of the two loading flags.
    in_flight: bool,
    /// Bumped by every refresh; a fetch whose generation no longer matches
    /// was superseded and must not touch state or flags.
    generation: u64,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 0,
            has_more: true,
            total_count: 0,
            is_loading: false,
            is_loading_more: false,
            error: None,
            in_flight: false,
            generation: 0,
        }
    }
}

struct PaginatorInner<T> {
    source: Arc<dyn PageSource<T>>,
    options: PaginatorOptions,
    state: Mutex<PageState<T>>,
}

/// Incremental pagination engine over one [`PageSource`].
///
/// Cheap to clone; clones share the same state. Spawned work holds only a
/// weak reference, so a fetch outliving every handle applies nothing.
pub struct Paginator<T> {
    inner: Arc<PaginatorInner<T>>,
}

impl<T> Clone for Paginator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> Paginator<T> {
    /// Create an engine without fetching anything.
    pub fn new(source: impl PageSource<T> + 'static, options: PaginatorOptions) -> Self {
        Self {
            inner: Arc::new(PaginatorInner {
                source: Arc::new(source),
                options,
                state: Mutex::new(PageState::default()),
            }),
        }
    }

    /// Create an engine and perform the initial load of page 0 exactly
    /// once, in the background.
    pub fn start(source: impl PageSource<T> + 'static, options: PaginatorOptions) -> Self {
        let paginator = Self::new(source, options);
        let weak = Arc::downgrade(&paginator.inner);
        tokio::spawn(async move {
            if let Some(inner) = weak.upgrade() {
                Paginator { inner }.refresh().await;
            }
        });
        paginator
    }

    /// Reset accumulated state and load page 0.
    ///
    /// A refresh always issues a new request, superseding any fetch still
    /// in flight: the stale result is discarded when it lands. The
    /// in-flight guard blocks only [`Paginator::load_more`].
    pub async fn refresh(&self) {
        self.load(0, true).await;
    }

    /// Fetch the next page and append it.
    ///
    /// No-op when the server reports no further pages or a fetch is
    /// already in flight.
    pub async fn load_more(&self) {
        let next = {
            let state = self.inner.state.lock();
            if !state.has_more || state.is_loading || state.is_loading_more {
                return;
            }
            state.current_page + 1
        };
        self.load(next, false).await;
    }

    /// React to a scroll-position observation, triggering an incremental
    /// load when the remaining distance to the bottom falls inside the
    /// configured threshold.
    pub async fn observe_scroll(&self, metrics: ScrollMetrics) {
        if metrics.distance_to_bottom() <= self.inner.options.scroll_threshold {
            self.load_more().await;
        }
    }

    async fn load(&self, page: u32, initial: bool) {
        let generation = {
            let mut state = self.inner.state.lock();
            if initial {
                state.generation += 1;
                state.items.clear();
                state.current_page = 0;
                state.has_more = true;
                state.total_count = 0;
                state.is_loading = true;
                state.is_loading_more = false;
                state.error = None;
            } else {
                if state.in_flight {
                    return;
                }
                state.is_loading_more = true;
            }
            state.in_flight = true;
            state.generation
        };

        // Loading flags and the guard are released on every exit path,
        // including cancellation mid-await. A superseded fetch leaves them
        // to the owner of the newer generation.
        let inner = Arc::clone(&self.inner);
        let _release = scopeguard::guard((), move |()| {
            let mut state = inner.state.lock();
            if state.generation == generation {
                state.is_loading = false;
                state.is_loading_more = false;
                state.in_flight = false;
            }
        });

        let result = self
            .inner
            .source
            .fetch_page(page, self.inner.options.page_size)
            .await;

        let mut state = self.inner.state.lock();
        if state.generation != generation {
            return;
        }
        match result {
            Ok(fetched) => {
                if initial {
                    state.items = fetched.data;
                    state.current_page = 0;
                } else {
                    state.items.extend(fetched.data);
                    state.current_page = page;
                }
                state.has_more = fetched.pagination.has_next;
                state.total_count = fetched.pagination.total_count;
                state.error = None;
                tracing::debug!(
                    page,
                    total = state.items.len(),
                    has_more = state.has_more,
                    "page applied"
                );
            }
            Err(err) => {
                // Previously fetched items stay visible behind the error.
                let message = err.message();
                tracing::warn!(page, error = %message, "page fetch failed");
                state.error = Some(message);
            }
        }
    }

    /// Clone of the externally visible state.
    pub fn snapshot(&self) -> PageSnapshot<T>
    where
        T: Clone,
    {
        let state = self.inner.state.lock();
        PageSnapshot {
            items: state.items.clone(),
            current_page: state.current_page,
            has_more: state.has_more,
            total_count: state.total_count,
            is_loading: state.is_loading,
            is_loading_more: state.is_loading_more,
            error: state.error.clone(),
        }
    }

    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.state.lock().items.clone()
    }

    pub fn has_more(&self) -> bool {
        self.inner.state.lock().has_more
    }

    pub fn total_count(&self) -> u64 {
        self.inner.state.lock().total_count
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().is_loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.inner.state.lock().is_loading_more
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.lock().error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(range: std::ops::Range<u32>, info: PageInfo) -> Page<u32> {
        Page {
            data: range.collect(),
            pagination: info,
        }
    }

    fn info(page: u32, has_next: bool, total_count: u64) -> PageInfo {
        PageInfo {
            page,
            page_size: 20,
            total_count,
            total_pages: 3,
            has_next,
            has_prev: page > 0,
        }
    }

    #[tokio::test]
    async fn refresh_replaces_items_wholesale() {
        let paginator = Paginator::new(
            source_fn(|page, _| async move { Ok(page_of(0..3, info(page, true, 9))) }),
            PaginatorOptions::default(),
        );

        paginator.refresh().await;
        paginator.load_more().await;
        assert_eq!(paginator.items().len(), 6);

        paginator.refresh().await;
        let snapshot = paginator.snapshot();
        assert_eq!(snapshot.items.len(), 3);
        assert_eq!(snapshot.current_page, 0);
    }

    #[tokio::test]
    async fn load_more_is_noop_without_more_pages() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let calls = Arc::new(AtomicU32::new(0));
        let counted = Arc::clone(&calls);
        let paginator = Paginator::new(
            source_fn(move |page, _| {
                counted.fetch_add(1, Ordering::SeqCst);
                async move { Ok(page_of(0..3, info(page, false, 3))) }
            }),
            PaginatorOptions::default(),
        );

        paginator.refresh().await;
        paginator.load_more().await;
        paginator.load_more().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!paginator.has_more());
    }

    #[tokio::test]
    async fn empty_non_terminal_page_is_accepted() {
        let paginator = Paginator::new(
            source_fn(|page, _| async move {
                Ok(Page {
                    data: Vec::<u32>::new(),
                    pagination: info(page, true, 40),
                })
            }),
            PaginatorOptions::default(),
        );

        paginator.refresh().await;
        paginator.load_more().await;

        // Appended nothing, never retried, still trusts the server.
        assert!(paginator.items().is_empty());
        assert!(paginator.has_more());
    }

    #[tokio::test]
    async fn fetch_error_retains_previous_items() {
        let paginator = Paginator::new(
            source_fn(|page, _| async move {
                if page == 0 {
                    Ok(page_of(0..20, info(0, true, 40)))
                } else {
                    Err(ApiError::Message("boom".to_string()))
                }
            }),
            PaginatorOptions::default(),
        );

        paginator.refresh().await;
        paginator.load_more().await;

        let snapshot = paginator.snapshot();
        assert_eq!(snapshot.items.len(), 20);
        assert_eq!(snapshot.current_page, 0);
        assert_eq!(snapshot.error.as_deref(), Some("boom"));
        assert!(!snapshot.is_loading && !snapshot.is_loading_more);
    }

    #[tokio::test]
    async fn error_clears_on_next_successful_fetch() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let attempts = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&attempts);
        let paginator = Paginator::new(
            source_fn(move |page, _| {
                let attempt = seen.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 1 {
                        Err(ApiError::Unknown)
                    } else {
                        Ok(page_of(0..5, info(page, true, 50)))
                    }
                }
            }),
            PaginatorOptions::default(),
        );

        paginator.refresh().await;
        paginator.load_more().await;
        assert!(paginator.error().is_some());

        paginator.load_more().await;
        assert!(paginator.error().is_none());
        assert_eq!(paginator.items().len(), 10);
    }
}
