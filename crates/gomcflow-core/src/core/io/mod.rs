//! Parsers and writers for the flat-file formats flowing through the
//! analysis pipeline.
//!
//! Three formats are handled: the engine's whitespace-delimited block-average
//! output (read only), the per-replicate fixed-width summary record (written
//! once per replicate, read back by the aggregator), and the append-only
//! cross-replicate report (one row per replicate group).

pub mod blk;
pub mod summary;
