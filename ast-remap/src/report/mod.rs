//! PIT `mutations.xml` reports.
//!
//! The reader turns each `<mutation>` element into a [`MutationRecord`];
//! entries missing a required field are skipped with a warning. The writer
//! emits relocated records in the same layout, with the original line and the
//! new source text added, so the output can be read back by the reader.
//!
//! [`MutationRecord`]: crate::mutation::MutationRecord

mod reader;
mod writer;

pub use reader::{parse_file, parse_str};
pub use writer::{write_remapped, write_remapped_to_string};
