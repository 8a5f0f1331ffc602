use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps model output indices to class names.
///
/// May be sparse: an index the model can emit but the map does not name is a
/// configuration defect reported at classification time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMap {
    entries: BTreeMap<usize, String>,
}

impl ClassMap {
    /// Dense map: the i-th label names output index i.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: labels
                .into_iter()
                .enumerate()
                .map(|(i, label)| (i, label.into()))
                .collect(),
        }
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(i, label)| (i, label.into())).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    /// Index of a class name, if present.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(_, name)| name.as_str() == label)
            .map(|(i, _)| *i)
    }

    /// Named classes in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(|(i, name)| (*i, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
