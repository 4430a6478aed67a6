//! Client core for live location sharing.
//!
//! A [`TrackerSession`] forwards local position fixes to the relay and keeps
//! one map marker per connected user, driven by events the host pushes into
//! an [`runtime::EventBus`].

pub mod config;
pub mod event;
pub mod session;

pub use config::*;
pub use event::*;
pub use session::*;
