//! # Workflows Module
//!
//! The user-facing layer tying `core` and `engine` together into the campaign
//! pipeline.
//!
//! ## Architecture
//!
//! - **Analysis** ([`analysis`]) - The two analysis operations: summarize one
//!   replicate's block output, aggregate one replicate group into the shared
//!   report
//! - **Campaign** ([`campaign`]) - Stage predicates, per-job stage execution,
//!   and the sequential driver that advances every job as far as it can go

pub mod analysis;
pub mod campaign;
