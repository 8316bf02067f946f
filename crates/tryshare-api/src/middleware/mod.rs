//! # HTTP Middleware
//!
//! Request-level concerns layered around the routers in [`crate::app`].

pub mod metrics;
