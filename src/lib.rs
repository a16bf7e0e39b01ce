//! Profile and credential management CLI for the Centavo payments platform.
//!
//! Resolves per-profile API keys across two trust tiers: a sandbox key that
//! may live in the plaintext profiles file, and a production key that only
//! ever lives in the platform secure store. Introspection never prints a
//! usable secret by default.
//!
//! ## Modules
//! - `cli` — Command-line handlers
//! - `core` — Business logic (resolution, storage, ingestion, audit)
//! - `models` — Data structures
//! - `util` — Filesystem and validation utilities

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod util;
