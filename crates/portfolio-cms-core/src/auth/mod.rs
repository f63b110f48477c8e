//! Authentication: the session store, its persisted storage, and the
//! route guard that gates protected views.
//!
//! This module provides:
//! - `SessionStore`: restoration, login, logout, profile updates
//! - `Storage`: durable key/value storage (`FileStorage`, `MemoryStorage`)
//! - `RouteGuard`: loading / render / redirect decisions per route

pub mod error;
pub mod guard;
pub mod session;
pub mod storage;

pub use error::AuthError;
pub use guard::{GuardDecision, Route, RouteGuard};
pub use session::{SessionState, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
