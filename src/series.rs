use serde::Serialize;

use crate::normalize::LabelCountRow;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SingleSeries {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

impl SingleSeries {
    pub fn from_rows(rows: &[LabelCountRow]) -> Self {
        let (labels, values) = rows
            .iter()
            .map(|row| (row.label.clone(), row.count))
            .unzip();
        Self { labels, values }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
