//! Writer for relocated mutation reports.

use std::io::Write;

use quick_xml::escape::escape;

use crate::mutation::UpdatedMutationRecord;

/// Writes relocated records as a `<mutations>` document.
///
/// Each `<mutation>` carries the rewritten class, method, descriptor and
/// line, followed by `<originalLineNumber>` and `<sourceText>`.
pub fn write_remapped<W: Write>(
    writer: &mut W,
    records: &[UpdatedMutationRecord],
) -> std::io::Result<()> {
    writeln!(writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(writer, "<mutations>")?;
    for updated in records {
        let record = updated.to_record();

        write!(writer, "<mutation")?;
        if let Some(detected) = record.detected {
            write!(writer, " detected='{}'", detected)?;
        }
        if let Some(status) = &record.status {
            write!(writer, " status='{}'", escape(status.as_str()))?;
        }
        write!(writer, ">")?;

        element(writer, "sourceFile", &record.source_file)?;
        element(writer, "mutatedClass", &record.mutated_class)?;
        element(writer, "mutatedMethod", &record.mutated_method)?;
        element(writer, "methodDescription", &record.method_descriptor)?;
        element(writer, "lineNumber", &record.line_number.to_string())?;
        element(writer, "mutator", &record.operator_id)?;

        write!(writer, "<indexes>")?;
        for index in &record.instruction_indices {
            element(writer, "index", &index.to_string())?;
        }
        write!(writer, "</indexes><blocks>")?;
        for block in &record.instruction_order {
            element(writer, "block", &block.to_string())?;
        }
        write!(writer, "</blocks>")?;

        if let Some(description) = &record.description {
            element(writer, "description", description)?;
        }
        element(
            writer,
            "originalLineNumber",
            &updated.original.line_number.to_string(),
        )?;
        element(writer, "sourceText", &updated.updated_source_text)?;
        writeln!(writer, "</mutation>")?;
    }
    writeln!(writer, "</mutations>")?;
    writer.flush()
}

/// Writes relocated records to a string.
pub fn write_remapped_to_string(records: &[UpdatedMutationRecord]) -> std::io::Result<String> {
    let mut output = Vec::new();
    write_remapped(&mut output, records)?;
    Ok(String::from_utf8_lossy(&output).to_string())
}

fn element<W: Write>(writer: &mut W, name: &str, text: &str) -> std::io::Result<()> {
    write!(writer, "<{}>{}</{}>", name, escape(text), name)
}
