//! Core domain logic for vibes.
//!
//! This crate is free of I/O: it holds the domain models, the repository
//! traits implemented by the storage backends, and the pure auth policies
//! (route guard, session enrichment, sign-in error classification).

pub mod auth;
pub mod model;
pub mod storage;
