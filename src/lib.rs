//! # Sessions API
//!
//! An in-memory, concurrency-safe session store with optimistic concurrency
//! control, plus the REST surface that exposes it.
//!
//! ## Features
//!
//! - **Versioned entities**: every successful write regenerates an opaque
//!   entity tag; a stale writer gets a conflict instead of silently losing
//!   an update
//! - **Per-entity locking**: conditional mutations serialize per id, never
//!   across the whole store, via a check-lock-recheck protocol
//! - **Filtered, paginated listing**: case-insensitive name and tag
//!   filters, newest first, clamped page sizes
//! - **Windowed aggregate**: mean session duration over a creation-time
//!   range
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sessions_api::prelude::*;
//! use std::sync::Arc;
//!
//! let repository: Arc<dyn SessionRepository> =
//!     Arc::new(InMemorySessionRepository::new());
//! let app = build_router(repository);
//! // hand `app` to axum::serve, or drive it directly in tests
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::core::{
        Page, PagedList, Session, SessionDraft, SessionFilter, SessionRepository, StoreError,
        Versioned,
    };
    pub use crate::server::{AppState, build_router};
    pub use crate::storage::InMemorySessionRepository;
}
