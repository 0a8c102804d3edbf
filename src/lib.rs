//! Client-side resource synchronization primitives for paged admin APIs.
//!
//! Three independent building blocks, each consumed by presentation code
//! but owning all timing, ordering, and error-shape decisions itself:
//!
//! - [`operation::Operation`] wraps a single backend call with a tracked
//!   `{data, is_loading, error}` state triple and notification hooks.
//! - [`paginate::Paginator`] accumulates pages of a server-paginated
//!   collection into one growing sequence, with a non-reentrant guard
//!   preventing overlapping fetches and optional scroll-driven triggering.
//! - [`token::TokenMonitor`] proactively renews an expiring session token
//!   in the background while a session is active.
//!
//! The [`api`] module is the collaborator boundary: it maps raw HTTP
//! responses into the closed [`error::ApiError`] union the primitives
//! switch on.

pub mod api;
pub mod error;
pub mod notify;
pub mod operation;
pub mod paginate;
pub mod token;

use std::future::Future;
use std::pin::Pin;

pub use error::{ApiError, ErrorDetail, SESSION_EXPIRED};
pub use notify::{Notifier, TracingNotifier};
pub use operation::{Operation, OperationOptions, OperationState};
pub use paginate::{
    source_fn, Page, PageInfo, PageSnapshot, PageSource, Paginator, PaginatorOptions,
    ScrollMetrics,
};
pub use token::{Session, SessionStore, TokenMonitor, TokenRefresher};

/// Owned future type used at the async trait seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
