//! Domain types shared by every Warden crate.
//!
//! - [`error`] -- the coarse-grained outcomes callers of the authentication
//!   service can observe.
//! - [`types`] -- identifier and timestamp aliases.

pub mod error;
pub mod types;
