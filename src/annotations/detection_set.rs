use crate::annotations::box_record::BoxRecord;
use serde::{Deserialize, Serialize};

/// An ordered sequence of box records belonging to one image.
///
/// The order is insertion order from the source file(s). It carries no
/// meaning of its own, but it is the tie-break input for suppression: of two
/// identically scored overlapping boxes, the earlier one survives.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ImageDetectionSet {
    records: Vec<BoxRecord>,
}

impl ImageDetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<BoxRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: BoxRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BoxRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoxRecord> {
        self.records.iter()
    }
}

impl IntoIterator for ImageDetectionSet {
    type Item = BoxRecord;
    type IntoIter = std::vec::IntoIter<BoxRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ImageDetectionSet {
    type Item = &'a BoxRecord;
    type IntoIter = std::slice::Iter<'a, BoxRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<BoxRecord> for ImageDetectionSet {
    fn from_iter<T: IntoIterator<Item = BoxRecord>>(iter: T) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}
