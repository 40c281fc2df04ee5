//! Typed campaign records and the workspace they are persisted in.
//!
//! A campaign is a set of jobs, one directory per job, each defined by an
//! immutable [`statepoint::StatePoint`] and carrying a mutable
//! [`document::JobDocument`] of derived runtime parameters. The
//! [`workspace::Project`] type owns the directory layout and the grouping of
//! replicate jobs into state-point groups.

pub mod document;
pub mod statepoint;
pub mod workspace;
