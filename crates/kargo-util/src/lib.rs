//! Shared error types for the Kargo build tool.
//!
//! This crate provides the cross-cutting error taxonomy used by all other
//! Kargo crates, built on `thiserror` and `miette` so CLI-facing callers get
//! rich diagnostics.

pub mod errors;
