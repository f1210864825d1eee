//! # Showtrack Core
//!
//! Engine behind the showtrack catalog browser: paged catalog access and
//! episode reminder bookkeeping.
//!
//! ## Overview
//!
//! - **Catalog paging** ([`catalog`]): independent, cancelable cursors for the
//!   popular, filtered, upcoming and search representations.
//! - **Air-date arithmetic** ([`episode_clock`]): which episodes are future,
//!   past, or new since an instant.
//! - **Reminders** ([`reminders`]): scheduling, cancelling and snoozing
//!   per-episode reminders against a pluggable backend.
//! - **Reconciliation** ([`updates`]): the updates feed across tracked shows
//!   and repair of reminders that went missing.
//! - **Providers** ([`providers`]): the remote catalog port and its TMDB
//!   adapter, plus poster loading.
//!
//! Nothing here reads process-wide settings; language and clock arrive
//! through [`CoreContext`].

pub mod catalog;
pub mod context;
pub mod episode_clock;
pub mod error;
pub mod infra;
pub mod providers;
pub mod reminders;
pub mod updates;

pub use context::{Clock, CoreContext, FixedClock, SystemClock};
pub use error::{
    CacheError, CatalogError, ReconcileError, ReminderError, StateError,
};

pub use showtrack_model as model;
