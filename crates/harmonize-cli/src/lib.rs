//! Library side of the `harmonize` binary: logging setup, the demo data set
//! and the output files written after a run.

pub mod demo;
pub mod logging;
pub mod output;
