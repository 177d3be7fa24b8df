// Format-neutral volume metadata report

use crate::FilesystemKind;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataReport {
    pub filesystem: FilesystemKind,
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub fields: Vec<ReportField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportField {
    pub name: String,
    pub value: String,
}

impl MetadataReport {
    pub fn new(filesystem: FilesystemKind) -> Self {
        Self { filesystem, sections: Vec::new() }
    }

    pub fn section(mut self, section: ReportSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Look up a field value by section title and field name.
    pub fn value(&self, section: &str, field: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.title == section)?
            .fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.value.as_str())
    }
}

impl ReportSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), fields: Vec::new() }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push(ReportField { name: name.into(), value: value.to_string() });
        self
    }
}

impl fmt::Display for MetadataReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------ Filesystem Information ------")?;
        writeln!(f)?;
        writeln!(f, "Filesystem: {}", self.filesystem)?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{} INFO", section.title.to_uppercase())?;
            let width = section.fields.iter().map(|field| field.name.len()).max().unwrap_or(0);
            for field in &section.fields {
                writeln!(f, "  {:<width$} : {}", field.name, field.value, width = width)?;
            }
        }
        Ok(())
    }
}
