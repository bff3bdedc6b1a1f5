use crate::document::Document;
use crate::wrap::wrap;
use std::ops::Range;

pub const DEFAULT_WRAP_WIDTH: usize = 80;

const KIND_PREFIX: &str = "KIND:     ";
const VERSION_PREFIX: &str = "VERSION:  ";
const RESOURCE_PREFIX: &str = "RESOURCE: ";
const DESCRIPTION_LABEL: &str = "DESCRIPTION:";
const FIELDS_LABEL: &str = "FIELDS:";
const EMPTY_PLACEHOLDER: &str = "<empty>";
const REQUIRED_SUFFIX: &str = " -required-";

const DESCRIPTION_INDENT: usize = 5;
const FIELD_INDENT: usize = 3;
const FIELD_DESCRIPTION_INDENT: usize = 2;
const FIELD_NAME_WIDTH: usize = 15;
const FIELD_NAME_MIN_GAP: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Render {
    pub lines: Vec<String>,
    /// Line index of each field's name line, strictly increasing.
    pub field_lines: Vec<usize>,
    /// Byte range of each field's name within its line.
    pub field_columns: Vec<Range<usize>>,
}

impl Render {
    pub fn total_height(&self) -> usize {
        self.lines.len()
    }

    pub fn field_count(&self) -> usize {
        self.field_lines.len()
    }
}

struct LineWriter {
    wrap_width: usize,
    indent: usize,
    lines: Vec<String>,
}

impl LineWriter {
    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{text}", " ".repeat(self.indent)));
        }
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn wrapped(&mut self, text: &str) {
        for line in wrap(text, self.wrap_width.saturating_sub(self.indent)) {
            self.line(&line);
        }
    }

    /// Paragraphs separated by blank lines, or a placeholder when all are empty.
    fn paragraphs(&mut self, texts: &[String]) {
        let mut emitted = false;
        for text in texts.iter().filter(|text| !text.is_empty()) {
            if emitted {
                self.blank();
            }
            self.wrapped(text);
            emitted = true;
        }
        if !emitted {
            self.line(EMPTY_PLACEHOLDER);
        }
    }
}

pub fn render(doc: &Document, wrap_width: usize) -> Render {
    let mut writer = LineWriter {
        wrap_width,
        indent: 0,
        lines: Vec::new(),
    };
    let identity = doc.identity();

    writer.line(&format!("{KIND_PREFIX}{}", identity.kind));
    writer.line(&format!("{VERSION_PREFIX}{}", identity.api_version()));
    writer.blank();

    let resource = doc.field_label();
    if !resource.is_empty() {
        writer.line(&format!("{RESOURCE_PREFIX}{resource}"));
        writer.blank();
    }

    writer.line(DESCRIPTION_LABEL);
    writer.indent = DESCRIPTION_INDENT;
    writer.paragraphs(&doc.descriptions());
    writer.indent = 0;

    writer.blank();
    writer.line(FIELDS_LABEL);

    let mut field_lines = Vec::new();
    let mut field_columns = Vec::new();
    if let Some(container) = doc.child_container() {
        for field in &container.fields {
            let gap = FIELD_NAME_WIDTH
                .checked_sub(field.name.len())
                .filter(|gap| *gap > 0)
                .unwrap_or(FIELD_NAME_MIN_GAP);
            let required = if field.required { REQUIRED_SUFFIX } else { "" };

            field_lines.push(writer.lines.len());
            field_columns.push(FIELD_INDENT..FIELD_INDENT + field.name.len());

            writer.indent = FIELD_INDENT;
            writer.line(&format!(
                "{}{}<{}>{required}",
                field.name,
                " ".repeat(gap),
                doc.type_name(&field.node)
            ));
            writer.indent = FIELD_INDENT + FIELD_DESCRIPTION_INDENT;
            writer.wrapped(&field.node.description);
            writer.indent = 0;
            writer.blank();
        }
    }

    Render {
        lines: writer.lines,
        field_lines,
        field_columns,
    }
}
