//! Categorical value → dense integer code.
//!
//! Codes are assigned in sorted order of the distinct values seen at fit time,
//! so the same vocabulary always yields the same codes regardless of row order.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    /// Name used in error messages (`"department"`, `"company"`).
    field: String,
    /// Code `i` decodes to `classes[i]`.
    classes: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FeatureEncoder {
    pub fn fit<I, S>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        Self::from_classes(field, distinct.into_iter().collect())
    }

    fn from_classes(field: &str, classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, value)| (value.clone(), code))
            .collect();
        Self {
            field: field.to_string(),
            classes,
            index,
        }
    }

    pub fn encode(&self, value: &str) -> Result<usize, AppError> {
        self.lookup(value).ok_or_else(|| AppError::UnknownCategory {
            field: self.field.clone(),
            value: value.to_string(),
        })
    }

    pub fn decode(&self, code: usize) -> Result<&str, AppError> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| AppError::UnknownCode {
                field: self.field.clone(),
                code,
            })
    }

    pub fn contains(&self, value: &str) -> bool {
        self.lookup(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Rebuild the lookup table after deserialization.
    pub(crate) fn reindexed(self) -> Self {
        Self::from_classes(&self.field, self.classes)
    }

    fn lookup(&self, value: &str) -> Option<usize> {
        if self.index.len() == self.classes.len() {
            self.index.get(value).copied()
        } else {
            self.classes.iter().position(|c| c == value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_sorted_vocabulary() {
        let enc = FeatureEncoder::fit("department", ["IT", "CSE", "ECE", "CSE"]);
        assert_eq!(enc.len(), 3);
        assert_eq!(enc.encode("CSE").unwrap(), 0);
        assert_eq!(enc.encode("ECE").unwrap(), 1);
        assert_eq!(enc.encode("IT").unwrap(), 2);
        // Stable across repeated calls.
        assert_eq!(enc.encode("ECE").unwrap(), 1);
    }

    #[test]
    fn decode_recovers_the_encoded_value() {
        let enc = FeatureEncoder::fit("department", ["MECH", "CSE"]);
        for value in ["MECH", "CSE"] {
            let code = enc.encode(value).unwrap();
            assert_eq!(enc.decode(code).unwrap(), value);
        }
        match enc.decode(7) {
            Err(AppError::UnknownCode { field, code }) => {
                assert_eq!(field, "department");
                assert_eq!(code, 7);
            }
            other => panic!("expected UnknownCode, got {other:?}"),
        }
    }

    #[test]
    fn unseen_value_fails_explicitly() {
        let enc = FeatureEncoder::fit("department", ["CSE"]);
        match enc.encode("BIO") {
            Err(AppError::UnknownCategory { field, value }) => {
                assert_eq!(field, "department");
                assert_eq!(value, "BIO");
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
        // Matching is exact: no silent case folding onto an existing code.
        assert!(enc.encode("cse").is_err());
    }

    #[test]
    fn lookups_work_after_serde_round_trip() {
        let enc = FeatureEncoder::fit("company", ["Growify", "URJA"]);
        let json = serde_json::to_string(&enc).unwrap();
        let loaded: FeatureEncoder = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.encode("URJA").unwrap(), 1);
        let loaded = loaded.reindexed();
        assert_eq!(loaded, enc);
        assert!(loaded.contains("Growify"));
    }
}
