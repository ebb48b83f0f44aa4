//! Text fields embedded in shape text.

use super::collector::Collector;
use super::list::{PatchList, Patchable};
use super::text::Text;
use std::collections::BTreeMap;

/// On-disk format code of a numeric field.
///
/// Codes are passed through unclassified; sinks map them to number, date or
/// time presentations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldFormat(pub u16);

impl FieldFormat {
    pub fn from_code(code: u16) -> Self {
        FieldFormat(code)
    }

    pub fn code(&self) -> u16 {
        self.0
    }
}

/// One resolved field definition.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldElement {
    /// Text looked up in the name table
    Text { name_id: i32, format_string_id: i32 },
    /// Number, date or time value
    Numeric {
        value: f64,
        format: FieldFormat,
        format_string_id: i32,
    },
}

/// Partial field definition.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPatch {
    Text {
        name_id: Option<i32>,
        format_string_id: Option<i32>,
    },
    Numeric {
        value: Option<f64>,
        format: Option<FieldFormat>,
        format_string_id: Option<i32>,
    },
}

impl Patchable for FieldElement {
    type Patch = FieldPatch;

    fn from_patch(patch: FieldPatch) -> Self {
        match patch {
            FieldPatch::Text {
                name_id,
                format_string_id,
            } => FieldElement::Text {
                name_id: name_id.unwrap_or(-1),
                format_string_id: format_string_id.unwrap_or(-1),
            },
            FieldPatch::Numeric {
                value,
                format,
                format_string_id,
            } => FieldElement::Numeric {
                value: value.unwrap_or(0.0),
                format: format.unwrap_or_default(),
                format_string_id: format_string_id.unwrap_or(-1),
            },
        }
    }

    fn merge(&mut self, patch: FieldPatch) -> Result<(), FieldPatch> {
        match (self, patch) {
            (
                FieldElement::Text {
                    name_id,
                    format_string_id,
                },
                FieldPatch::Text {
                    name_id: new_name,
                    format_string_id: new_format,
                },
            ) => {
                if let Some(v) = new_name {
                    *name_id = v;
                }
                if let Some(v) = new_format {
                    *format_string_id = v;
                }
                Ok(())
            },
            (
                FieldElement::Numeric {
                    value,
                    format,
                    format_string_id,
                },
                FieldPatch::Numeric {
                    value: new_value,
                    format: new_format,
                    format_string_id: new_format_string,
                },
            ) => {
                if let Some(v) = new_value {
                    *value = v;
                }
                if let Some(v) = new_format {
                    *format = v;
                }
                if let Some(v) = new_format_string {
                    *format_string_id = v;
                }
                Ok(())
            },
            (_, patch) => Err(patch),
        }
    }
}

/// Names referenced by text fields, keyed by name id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameTable {
    names: BTreeMap<u32, Text>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, name: Text) {
        self.names.insert(id, name);
    }

    /// Decoded name for a field's name id.
    pub fn resolve(&self, name_id: i32) -> Option<String> {
        let id = u32::try_from(name_id).ok()?;
        self.names.get(&id).map(Text::decode)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Field list of a shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldList {
    pub id: u32,
    pub level: u32,
    elements: PatchList<FieldElement>,
}

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the list's own header.
    pub fn set_header(&mut self, id: u32, level: u32) {
        self.id = id;
        self.level = level;
    }

    pub fn add(&mut self, id: u32, level: u32, patch: FieldPatch) {
        self.elements.add(id, level, patch);
    }

    pub fn set_order(&mut self, order: Vec<u32>) {
        self.elements.set_order(order);
    }

    pub fn get(&self, id: u32) -> Option<&FieldElement> {
        self.elements.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Replay the fields, resolving text fields against `names`.
    pub fn handle(&self, names: &NameTable, collector: &mut dyn Collector) {
        if self.elements.is_empty() {
            return;
        }
        collector.collect_field_list(self.id, self.level);
        for (id, entry) in self.elements.iter() {
            match entry.element {
                FieldElement::Text {
                    name_id,
                    format_string_id,
                } => {
                    let text = names.resolve(name_id);
                    collector.collect_text_field(
                        id,
                        entry.level,
                        name_id,
                        format_string_id,
                        text.as_deref(),
                    );
                },
                FieldElement::Numeric {
                    value,
                    format,
                    format_string_id,
                } => collector.collect_numeric_field(id, entry.level, format, value, format_string_id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::vsd::text::TextEncoding;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Collector for Recorder {
        fn collect_field_list(&mut self, id: u32, _level: u32) {
            self.events.push(format!("list {id}"));
        }
        fn collect_text_field(
            &mut self,
            id: u32,
            _level: u32,
            name_id: i32,
            _format_string_id: i32,
            text: Option<&str>,
        ) {
            self.events.push(format!("text {id} {name_id} {}", text.unwrap_or("-")));
        }
        fn collect_numeric_field(
            &mut self,
            id: u32,
            _level: u32,
            format: FieldFormat,
            value: f64,
            _format_string_id: i32,
        ) {
            self.events.push(format!("number {id} {value} {}", format.code()));
        }
    }

    #[test]
    fn test_format_code_passes_through() {
        assert_eq!(FieldFormat::from_code(21).code(), 21);
        assert_eq!(FieldFormat::from_code(0xffff), FieldFormat(0xffff));
        assert_eq!(FieldFormat::default().code(), 0);
    }

    #[test]
    fn test_handle_resolves_names() {
        let mut names = NameTable::new();
        names.insert(3, Text::new(vec![b'A', 0, b'B', 0], TextEncoding::Utf16Le));

        let mut fields = FieldList::new();
        fields.set_header(11, 2);
        fields.add(
            1,
            3,
            FieldPatch::Numeric {
                value: Some(2.5),
                format: Some(FieldFormat::from_code(20)),
                format_string_id: None,
            },
        );
        fields.add(
            0,
            3,
            FieldPatch::Text {
                name_id: Some(3),
                format_string_id: None,
            },
        );
        fields.add(
            2,
            3,
            FieldPatch::Text {
                name_id: Some(99),
                format_string_id: None,
            },
        );

        let mut recorder = Recorder::default();
        fields.handle(&names, &mut recorder);
        assert_eq!(
            recorder.events,
            vec!["list 11", "text 0 3 AB", "number 1 2.5 20", "text 2 99 -"]
        );
    }

    #[test]
    fn test_empty_list_is_silent() {
        let mut recorder = Recorder::default();
        FieldList::new().handle(&NameTable::new(), &mut recorder);
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn test_negative_name_id_unresolved() {
        let mut names = NameTable::new();
        names.insert(0, Text::new(vec![b'x', 0], TextEncoding::Utf16Le));
        assert_eq!(names.resolve(-1), None);
        assert_eq!(names.resolve(0).as_deref(), Some("x"));
    }
}
