//! Domain types for openFDA drug lookups.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::charts::ChartDatum;

/// A user-entered drug name: trimmed and never empty. Case and spelling are
/// passed through to the API untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DrugName(String);

impl DrugName {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrugName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `openfda` block of a label record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenFdaFields {
    #[serde(default)]
    pub brand_name: Vec<String>,
    #[serde(default)]
    pub manufacturer_name: Vec<String>,
}

/// The parts of a structured product label shown on a card. Every section is
/// an array of paragraphs in the API; only the first one is displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelDocument {
    #[serde(default)]
    pub openfda: Option<OpenFdaFields>,
    #[serde(default)]
    pub dosage_and_administration: Vec<String>,
    #[serde(default)]
    pub do_not_use: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

fn first_non_empty(values: &[String]) -> Option<&str> {
    values
        .first()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

impl LabelDocument {
    pub fn brand_name(&self) -> Option<&str> {
        self.openfda
            .as_ref()
            .and_then(|fields| first_non_empty(&fields.brand_name))
    }

    pub fn manufacturer_name(&self) -> Option<&str> {
        self.openfda
            .as_ref()
            .and_then(|fields| first_non_empty(&fields.manufacturer_name))
    }

    pub fn dosage_and_administration(&self) -> Option<&str> {
        first_non_empty(&self.dosage_and_administration)
    }

    pub fn do_not_use(&self) -> Option<&str> {
        first_non_empty(&self.do_not_use)
    }

    pub fn warnings(&self) -> Option<&str> {
        first_non_empty(&self.warnings)
    }
}

/// Result of the label lookup: a document, or the "no data" sentinel text.
#[derive(Debug, Clone, PartialEq)]
pub enum Labeling {
    Document(Box<LabelDocument>),
    NotFound(String),
}

impl Labeling {
    pub fn not_found(name: &DrugName) -> Self {
        Self::NotFound(format!("No data found for {name}"))
    }

    pub fn document(&self) -> Option<&LabelDocument> {
        match self {
            Self::Document(doc) => Some(doc),
            Self::NotFound(_) => None,
        }
    }
}

/// `{term, count}` bucket from a count query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

/// `{time, count}` bucket from a date count query; `time` is `YYYYMMDD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCount {
    #[serde(deserialize_with = "string_or_number")]
    pub time: String,
    pub count: u64,
}

/// openFDA has served date buckets both as `"20230615"` and `20230615`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

impl From<&TermCount> for ChartDatum {
    fn from(value: &TermCount) -> Self {
        ChartDatum::new(value.term.clone(), value.count)
    }
}

impl From<&TimeCount> for ChartDatum {
    fn from(value: &TimeCount) -> Self {
        ChartDatum::new(value.time.clone(), value.count)
    }
}

/// Everything fetched for one drug. Each field is `None` until its source
/// has reported successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugRecord {
    pub name: DrugName,
    pub labeling: Option<Labeling>,
    pub adverse_events: Option<Vec<TermCount>>,
    pub recall_frequency: Option<Vec<TimeCount>>,
}

impl DrugRecord {
    pub fn empty(name: DrugName) -> Self {
        Self {
            name,
            labeling: None,
            adverse_events: None,
            recall_frequency: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.labeling.is_some() && self.adverse_events.is_some() && self.recall_frequency.is_some()
    }

    pub fn adverse_event_series(&self) -> Option<Vec<ChartDatum>> {
        self.adverse_events
            .as_ref()
            .map(|events| events.iter().map(ChartDatum::from).collect())
    }

    pub fn recall_series(&self) -> Option<Vec<ChartDatum>> {
        self.recall_frequency
            .as_ref()
            .map(|recalls| recalls.iter().map(ChartDatum::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drug_names_are_trimmed_and_non_empty() {
        assert_eq!(DrugName::parse("  aspirin \n").unwrap().as_str(), "aspirin");
        assert!(DrugName::parse("   ").is_none());
        assert!(DrugName::parse("").is_none());
        // No normalisation beyond trimming.
        assert_eq!(DrugName::parse("Advil").unwrap().as_str(), "Advil");
    }

    #[test]
    fn label_accessors_skip_blank_values() {
        let doc: LabelDocument = serde_json::from_value(serde_json::json!({
            "openfda": {
                "brand_name": ["Advil"],
                "manufacturer_name": [""],
                "generic_name": ["IBUPROFEN"]
            },
            "warnings": ["Allergy alert"],
            "spl_id": "ignored"
        }))
        .unwrap();
        assert_eq!(doc.brand_name(), Some("Advil"));
        assert_eq!(doc.manufacturer_name(), None);
        assert_eq!(doc.warnings(), Some("Allergy alert"));
        assert_eq!(doc.do_not_use(), None);
    }

    #[test]
    fn time_buckets_accept_strings_and_numbers() {
        let buckets: Vec<TimeCount> = serde_json::from_value(serde_json::json!([
            { "time": "20230615", "count": 2 },
            { "time": 20230616, "count": 5 }
        ]))
        .unwrap();
        assert_eq!(buckets[0].time, "20230615");
        assert_eq!(buckets[1].time, "20230616");
    }

    #[test]
    fn recall_series_maps_time_to_term() {
        let mut record = DrugRecord::empty(DrugName::parse("aspirin").unwrap());
        assert!(record.recall_series().is_none());
        record.recall_frequency = Some(vec![TimeCount {
            time: "20230615".into(),
            count: 3,
        }]);
        assert_eq!(
            record.recall_series().unwrap(),
            vec![ChartDatum::new("20230615", 3)]
        );
    }

    #[test]
    fn not_found_sentinel_names_the_drug() {
        let name = DrugName::parse("zzz").unwrap();
        assert_eq!(
            Labeling::not_found(&name),
            Labeling::NotFound("No data found for zzz".into())
        );
    }
}
