//! # API Route Modules
//!
//! Each module exposes a `router()` that the top-level [`crate::app`]
//! merges. Handlers are thin: they parse, delegate to the registry, and
//! map the outcome through [`crate::error::AppError`].

pub mod tricycles;
