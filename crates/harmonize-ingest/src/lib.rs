//! Record I/O for harmonization batches.

pub mod digest;
pub mod reader;
pub mod writer;

pub use digest::{digest_bytes, digest_file};
pub use reader::{parse_batch, read_batch, sniff_delimiter};
pub use writer::{render_records, temp_path, write_atomic, write_json, write_records};
