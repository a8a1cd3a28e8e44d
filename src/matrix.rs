use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::Totals;
use crate::domain::LabelOrder;
use crate::normalize::{DiseaseTissueRow, SpeciesDiseaseRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixOptions {
    pub order: LabelOrder,
    pub normalize_rows: bool,
    pub top_rows: Option<usize>,
    pub top_columns: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Matrix {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub grid: Vec<Vec<f64>>,
    pub normalized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Matrix {
    pub fn build<'a, I>(entries: I, options: &MatrixOptions) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, i64)>,
    {
        let entries: Vec<(&str, &str, i64)> = entries.into_iter().collect();
        let row_totals = Totals::accumulate(&entries, |entry| entry.0, |entry| entry.2);
        let column_totals = Totals::accumulate(&entries, |entry| entry.1, |entry| entry.2);

        let row_labels = select_labels(&row_totals, options.order, options.top_rows);
        let column_labels = select_labels(&column_totals, options.order, options.top_columns);

        let row_index = index_of(&row_labels);
        let column_index = index_of(&column_labels);

        let mut grid = vec![vec![0.0; column_labels.len()]; row_labels.len()];
        for (row, column, value) in entries {
            let (Some(&r), Some(&c)) = (row_index.get(row), column_index.get(column)) else {
                continue;
            };
            grid[r][c] += value as f64;
        }

        let mut matrix = Self {
            row_labels,
            column_labels,
            grid,
            normalized: false,
        };
        if options.normalize_rows {
            matrix.normalize_rows();
        }
        matrix
    }

    pub fn normalize_rows(&mut self) {
        for row in &mut self.grid {
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if max > 0.0 {
                for cell in row.iter_mut() {
                    *cell /= max;
                }
            }
        }
        self.normalized = true;
    }

    pub fn transpose(&self) -> Self {
        let grid = (0..self.column_labels.len())
            .map(|c| self.grid.iter().map(|row| row[c]).collect())
            .collect();
        Self {
            row_labels: self.column_labels.clone(),
            column_labels: self.row_labels.clone(),
            grid,
            normalized: self.normalized,
        }
    }

    pub fn cell(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|label| label == row)?;
        let c = self.column_labels.iter().position(|label| label == column)?;
        Some(self.grid[r][c])
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.column_labels.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() && self.column_labels.is_empty()
    }

    pub fn column_series(&self) -> Vec<Series> {
        self.column_labels
            .iter()
            .enumerate()
            .map(|(c, name)| Series {
                name: name.clone(),
                values: self.grid.iter().map(|row| row[c]).collect(),
            })
            .collect()
    }
}

fn select_labels(totals: &Totals, order: LabelOrder, limit: Option<usize>) -> Vec<String> {
    let keep = limit.map(|n| totals.top_n(n));
    let allowed = |key: &str| keep.as_ref().is_none_or(|top| top.iter().any(|k| k == key));
    match order {
        LabelOrder::TotalDescending => totals
            .ranked()
            .into_iter()
            .map(|(key, _)| key)
            .filter(|&key| allowed(key))
            .map(str::to_string)
            .collect(),
        LabelOrder::FirstSeen => totals
            .keys()
            .filter(|&key| allowed(key))
            .map(str::to_string)
            .collect(),
    }
}

fn index_of(labels: &[String]) -> HashMap<&str, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect()
}

pub fn disease_species_matrix(rows: &[SpeciesDiseaseRow], options: &MatrixOptions) -> Matrix {
    Matrix::build(
        rows.iter().map(|row| {
            (
                row.disease_label.as_str(),
                row.species_label.as_str(),
                row.go_annotation_count,
            )
        }),
        options,
    )
}

pub fn disease_tissue_matrix(rows: &[DiseaseTissueRow], options: &MatrixOptions) -> Matrix {
    Matrix::build(
        rows.iter().map(|row| {
            (
                row.disease_label.as_str(),
                row.tissue_label.as_str(),
                row.gene_count,
            )
        }),
        options,
    )
}
