//! ast-remap - structural AST differencing for mutation-testing findings
//!
//! This library relocates a mutation recorded against one revision of a source
//! file onto a later, edited revision of the same file.
//!
//! # Overview
//!
//! Both revisions are parsed into syntax trees and matched with a
//! GumTree-style algorithm:
//!
//! - a top-down phase maps the largest identical subtrees,
//! - a bottom-up phase maps containers whose descendants mostly match, using
//!   the Dice coefficient,
//! - matched containers are refined with an exact Zhang–Shasha tree edit
//!   distance when they are small enough.
//!
//! The remap resolver then follows the mappings from the stale line to the
//! new one and recovers the enclosing method, class and JVM descriptor.
//!
//! # Example
//!
//! A method parameter is renamed and a blank line is inserted above the
//! method. The mutation on `return a + b;` moves from line 5 to line 6, still
//! in `add` with descriptor `(II)I`.
//!
//! ```no_run
//! use ast_remap::{remap, syntax::java, MutationRecord};
//!
//! let old = java::parse_file("old/Calculator.java")?;
//! let new = java::parse_file("new/Calculator.java")?;
//! let record = MutationRecord {
//!     mutated_class: "demo.Calculator".into(),
//!     mutated_method: "add".into(),
//!     method_descriptor: "(II)I".into(),
//!     line_number: 5,
//!     ..Default::default()
//! };
//! if let Some(updated) = remap(&old, &new, &record, &[]) {
//!     println!("{}", updated);
//! }
//! # Ok::<(), ast_remap::Error>(())
//! ```

pub mod constants;
pub mod descriptor;
pub mod error;
pub mod matching;
pub mod measure;
pub mod mutation;
pub mod remap;
pub mod report;
pub mod syntax;
pub mod ted;
pub mod tree;
pub mod xml;

// Re-export commonly used types
pub use constants::*;
pub use descriptor::{compute_method_descriptor, DescriptorContext};
pub use error::{Error, Result};
pub use matching::{
    BottomUp, Mapping, MappingStore, MatchPhase, MatchResult, Matcher, MatcherConfig, TopDown,
};
pub use measure::dice;
pub use mutation::{MutationRecord, UpdatedMutationRecord};
pub use remap::{remap, remap_with, Remapper};
pub use syntax::{parse_path, SourceParser, SyntaxNode, SyntaxTree};
pub use ted::{EditOperation, ZsRefiner};
pub use tree::{NodeRef, NodeWrapper, TedNode};
