//! Constants used throughout ast-remap.

/// Subtrees at or below this height are never matched by the top-down phase.
pub const MIN_HEIGHT: usize = 2;

/// A bottom-up container candidate must score strictly above this Dice value.
pub const MIN_DICE: f64 = 0.5;

/// Combined reduced-tree size at which edit-distance refinement is skipped.
pub const MAX_SIZE: usize = 100;

/// Cost of deleting a node from the source tree.
pub const DELETE_COST: f64 = 1.0;

/// Cost of inserting a node into the destination tree.
pub const INSERT_COST: f64 = 1.0;

/// Cost of relabeling a node. Equal nodes change for free.
pub const CHANGE_COST: f64 = 1.0;

/// JVM name of an instance initializer.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Descriptor reported for constructors.
pub const CONSTRUCTOR_DESCRIPTOR: &str = "()V";

/// Node kinds that declare a method.
pub const METHOD_KINDS: &[&str] = &["method_declaration", "constructor_declaration"];

/// Node kinds that declare a named type.
pub const TYPE_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// Type kinds a mutated method may be enclosed by.
pub const ENCLOSING_TYPE_KINDS: &[&str] = &[
    "class_declaration",
    "record_declaration",
    "enum_declaration",
    "interface_declaration",
];
