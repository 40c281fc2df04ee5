//! # GOMCFlow Core Library
//!
//! Workflow automation for GOMC Monte Carlo simulation campaigns: workspace
//! and state-point management, simulation input generation, phased engine
//! execution, and replicate-averaged analysis of block-output data.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains the stateless campaign records
//!   (`StatePoint`, `JobDocument`, the workspace layout), parsers and writers for
//!   the flat-file formats flowing through the pipeline, and descriptive
//!   statistics helpers.
//!
//! - **[`engine`]: The Logic Core.** Owns everything that touches the external
//!   GOMC engine: the explicit campaign configuration, the control-file writer,
//!   console-log status scanning, and process invocation.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer. It
//!   ties `engine` and `core` together into the campaign pipeline stages and the
//!   two analysis operations (per-replicate summary, cross-replicate
//!   aggregation) that a front end invokes.

pub mod core;
pub mod engine;
pub mod workflows;
