//! Water Balloon Fight: a seeded run of the fight kernel with a report.
//!
//! - `seed`: lenient seed parsing with a process-id fallback
//! - `runner`: wires configuration, narration and the coordinator together
//! - `results`: serializable report of a finished fight

pub mod results;
pub mod runner;
pub mod seed;
