//! XML interchange format for syntax trees.
//!
//! Trees built by any parser can be fed to the matcher in this format, and
//! parsed trees can be dumped for inspection:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <tree kind="method_declaration" line="4">
//!   <tree kind="integral_type" value="int" field="type" line="4" />
//!   <tree kind="identifier" value="add" field="name" line="4" />
//! </tree>
//! ```
//!
//! `kind` is required. `line` defaults to the parent's line, or 1 at the
//! root. Trees loaded from XML carry no source text.

mod parser;
mod printer;

pub use parser::{parse_file, parse_str};
pub use printer::{print_to_string, XmlPrinter};

/// Element name of a tree node.
pub(crate) const TREE_TAG: &str = "tree";
