//! Grizzly API module.
//!
//! The client side of the API: login, user listing, and section submission.

pub mod client;
pub mod types;

pub use client::GrizzlyClient;
pub use types::*;
