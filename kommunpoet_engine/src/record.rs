// Municipality records.
//
// A `Record` is one municipality: a stable identifier (the article slug,
// e.g. "Huddinge_kommun"), a display name, the article text cut into
// sections, and the serialized chain model trained on that text.
//
// Records are immutable values once compiled. Recompiling builds a new
// `Record` (`compiled`) that the caller swaps in whole; readers never see a
// record with new sections but an old model.
//
// The model is stored as raw JSON and only decoded when a chaos poem is
// requested. A corrupt model therefore breaks chaos mode for that record
// and nothing else.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PoetConfig;
use crate::error::PoemError;
use crate::markov::TextModel;
use crate::sections::filter_sections;

/// The text of one article section, one string per paragraph.
pub type Section = Vec<String>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Article slug, e.g. "Huddinge_kommun".
    pub id: String,
    /// Display name, e.g. "Huddinge kommun".
    pub name: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Serialized `TextModel`, present once compiled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markov: Option<serde_json::Value>,
}

impl Record {
    /// A freshly registered, uncompiled record.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sections: Vec::new(),
            markov: None,
        }
    }

    /// Whether the record has both sections and a model.
    pub fn is_compiled(&self) -> bool {
        !self.sections.is_empty() && self.markov.as_ref().is_some_and(|m| !m.is_null())
    }

    /// Sections long enough to make a poem from (see `filter_sections`).
    pub fn filtered_sections(&self, config: &PoetConfig) -> Vec<&Section> {
        filter_sections(&self.sections, config)
    }

    /// All paragraphs of all sections joined by single spaces.
    pub fn flatten_sections(&self) -> String {
        self.sections
            .iter()
            .map(|section| section.join(" "))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build the compiled version of this record from freshly extracted
    /// sections, training a new model on them.
    pub fn compiled(&self, sections: Vec<Section>, config: &PoetConfig) -> Result<Record, PoemError> {
        let mut record = Record {
            id: self.id.clone(),
            name: self.name.clone(),
            sections,
            markov: None,
        };
        let model = TextModel::train(&record.flatten_sections(), config.state_size);
        debug!(
            id = %record.id,
            sections = record.sections.len(),
            states = model.chain().len(),
            "trained chain"
        );
        record.markov = Some(model.to_value()?);
        Ok(record)
    }

    /// Decode the stored model.
    pub fn text_model(&self) -> Result<TextModel, PoemError> {
        match &self.markov {
            Some(value) if !value.is_null() => TextModel::from_value(value),
            _ => Err(PoemError::MissingModel {
                id: self.id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(paragraphs: &[&str]) -> Section {
        paragraphs.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn new_record_is_not_compiled() {
        let record = Record::new("Ale_kommun", "Ale kommun");
        assert!(!record.is_compiled());
        assert!(matches!(
            record.text_model(),
            Err(PoemError::MissingModel { .. })
        ));
    }

    #[test]
    fn flatten_joins_everything_with_spaces() {
        let mut record = Record::new("x", "X");
        record.sections = vec![section(&["a b", "c"]), section(&["d"])];
        assert_eq!(record.flatten_sections(), "a b c d");
    }

    #[test]
    fn compiled_returns_new_record_and_leaves_original() {
        let original = Record::new("Ale_kommun", "Ale kommun");
        let compiled = original
            .compiled(
                vec![section(&["Ale ligger vid älven. Ale har en kyrka."])],
                &PoetConfig::default(),
            )
            .unwrap();

        assert!(!original.is_compiled());
        assert!(compiled.is_compiled());
        assert_eq!(compiled.id, "Ale_kommun");
        assert_eq!(compiled.name, "Ale kommun");
        let model = compiled.text_model().unwrap();
        assert_eq!(model.chain().state_size(), 2);
    }

    #[test]
    fn empty_sections_are_not_compiled() {
        let compiled = Record::new("x", "X")
            .compiled(Vec::new(), &PoetConfig::default())
            .unwrap();
        assert!(!compiled.is_compiled());
    }

    #[test]
    fn null_model_counts_as_missing() {
        let mut record = Record::new("x", "X");
        record.sections = vec![section(&["text"])];
        record.markov = Some(serde_json::Value::Null);
        assert!(!record.is_compiled());
    }

    #[test]
    fn record_json_roundtrip() {
        let record = Record::new("Ale_kommun", "Ale kommun")
            .compiled(vec![section(&["Ale ligger vid älven."])], &PoetConfig::default())
            .unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let restored: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(record, restored);
    }

    #[test]
    fn record_without_optional_fields_deserializes() {
        let record: Record = serde_json::from_str(r#"{"id": "a", "name": "A"}"#).unwrap();
        assert!(record.sections.is_empty());
        assert!(record.markov.is_none());
    }
}
