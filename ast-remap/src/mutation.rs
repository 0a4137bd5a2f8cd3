//! Mutation-testing findings and their relocated form.

use std::fmt;

/// A mutation as reported against one revision of a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationRecord {
    /// Source file name, without directories.
    pub source_file: String,
    /// Fully qualified binary name of the mutated class (`pkg.Outer$Inner`).
    pub mutated_class: String,
    pub mutated_method: String,
    /// JVM descriptor of the mutated method.
    pub method_descriptor: String,
    /// 1-based line in the revision the report was produced for.
    pub line_number: usize,
    /// Mutation operator id.
    pub operator_id: String,
    /// Bytecode instruction indices touched by the mutation.
    pub instruction_indices: Vec<usize>,
    /// Basic-block order of the mutated instructions.
    pub instruction_order: Vec<usize>,
    /// Outcome reported by the tool (`SURVIVED`, `KILLED`, ...).
    pub status: Option<String>,
    pub detected: Option<bool>,
    pub description: Option<String>,
}

impl MutationRecord {
    /// Returns true if the record belongs to the given file name.
    pub fn is_in_file(&self, file_name: &str) -> bool {
        self.source_file == file_name
    }
}

impl fmt::Display for MutationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{} line {} ({})",
            self.mutated_class,
            self.mutated_method,
            self.method_descriptor,
            self.line_number,
            self.operator_id
        )
    }
}

/// A mutation record relocated onto a newer revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedMutationRecord {
    /// The record as reported.
    pub original: MutationRecord,
    /// 1-based line in the new revision.
    pub line_number: usize,
    /// Fully qualified binary name of the enclosing class in the new revision.
    pub enclosing_class_name: String,
    pub enclosing_method_name: String,
    pub method_descriptor: String,
    /// Trimmed text of the new line, empty if the source is unavailable.
    pub updated_source_text: String,
}

impl UpdatedMutationRecord {
    /// Returns the record rewritten with the relocated position.
    pub fn to_record(&self) -> MutationRecord {
        MutationRecord {
            mutated_class: self.enclosing_class_name.clone(),
            mutated_method: self.enclosing_method_name.clone(),
            method_descriptor: self.method_descriptor.clone(),
            line_number: self.line_number,
            ..self.original.clone()
        }
    }

    /// Returns true if relocation changed nothing but possibly the line.
    pub fn same_method(&self) -> bool {
        self.original.mutated_class == self.enclosing_class_name
            && self.original.mutated_method == self.enclosing_method_name
            && self.original.method_descriptor == self.method_descriptor
    }
}

impl fmt::Display for UpdatedMutationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{} line {} -> line {}: {}",
            self.enclosing_class_name,
            self.enclosing_method_name,
            self.method_descriptor,
            self.original.line_number,
            self.line_number,
            self.updated_source_text
        )
    }
}
