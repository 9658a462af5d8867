// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Normalising the watched extension list ([`extensions`]).
//! - Expanding the watched roots into a directory set ([`paths`]).
//! - Wiring up a cross-platform filesystem watcher (`notify`) and filtering
//!   its events ([`watcher`], [`event_handler`]).
//! - Debouncing bursts of changes ([`debounce`]) into a latest-wins rebuild
//!   signal ([`signal`]).
//!
//! It does **not** know about builds or processes; it only turns
//! filesystem changes into rebuild requests.

pub mod debounce;
pub mod event_handler;
pub mod extensions;
pub mod paths;
pub mod signal;
pub mod watcher;

pub use debounce::Debouncer;
pub use event_handler::ChangeFilter;
pub use extensions::ExtensionFilter;
pub use paths::expand_watch_paths;
pub use signal::{rebuild_channel, RebuildReceiver, RebuildRequest, RebuildSender};
pub use watcher::{spawn_watcher, EventForwarder, WatcherHandle};
