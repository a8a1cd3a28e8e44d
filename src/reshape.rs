use serde::Serialize;

use crate::binding::ResultRow;
use crate::bubble::BubbleChart;
use crate::domain::{LabelOrder, VisMode};
use crate::matrix::{Matrix, MatrixOptions, disease_species_matrix, disease_tissue_matrix};
use crate::normalize;
use crate::series::SingleSeries;
use crate::similarity::{SimilarityGraph, SimilarityOptions, build_graph};

pub const DEFAULT_BUBBLE_TOP_N: usize = 10;
pub const DEFAULT_HEATMAP_TOP_N: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum Visualization {
    Graph(SimilarityGraph),
    Matrix(Matrix),
    Series(SingleSeries),
    Bubble(BubbleChart),
}

impl Visualization {
    pub fn kind(&self) -> &'static str {
        match self {
            Visualization::Graph(_) => "graph",
            Visualization::Matrix(_) => "matrix",
            Visualization::Series(_) => "series",
            Visualization::Bubble(_) => "bubble",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Visualization::Graph(graph) => graph.is_empty(),
            Visualization::Matrix(matrix) => matrix.is_empty(),
            Visualization::Series(series) => series.is_empty(),
            Visualization::Bubble(chart) => chart.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub similarity: SimilarityOptions,
    pub label_order: LabelOrder,
    pub normalize_rows: bool,
    pub bubble_top_n: usize,
    pub heatmap_top_n: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            similarity: SimilarityOptions::default(),
            label_order: LabelOrder::TotalDescending,
            normalize_rows: false,
            bubble_top_n: DEFAULT_BUBBLE_TOP_N,
            heatmap_top_n: DEFAULT_HEATMAP_TOP_N,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn process(&self, mode: VisMode, rows: &[ResultRow]) -> Visualization {
        let options = &self.options;
        match mode {
            VisMode::Graph => {
                let rows = normalize::disease_go_rows(rows);
                Visualization::Graph(build_graph(&rows, options.similarity))
            }
            VisMode::GroupedBar => {
                let rows = normalize::species_disease_rows(rows);
                let matrix_options = MatrixOptions {
                    order: options.label_order,
                    normalize_rows: options.normalize_rows,
                    ..MatrixOptions::default()
                };
                Visualization::Matrix(disease_species_matrix(&rows, &matrix_options))
            }
            VisMode::Bar => {
                let rows = normalize::label_count_rows(rows);
                Visualization::Series(SingleSeries::from_rows(&rows))
            }
            VisMode::Bubble => {
                let rows = normalize::disease_tissue_rows(rows);
                Visualization::Bubble(BubbleChart::build(&rows, options.bubble_top_n))
            }
            VisMode::Heatmap => {
                let rows = normalize::disease_tissue_rows(rows);
                let matrix_options = MatrixOptions {
                    order: options.label_order,
                    normalize_rows: false,
                    top_rows: Some(options.heatmap_top_n),
                    top_columns: Some(options.heatmap_top_n),
                };
                let mut matrix = disease_tissue_matrix(&rows, &matrix_options).transpose();
                if options.normalize_rows {
                    matrix.normalize_rows();
                }
                Visualization::Matrix(matrix)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rows_give_empty_structures() {
        let pipeline = Pipeline::default();
        for mode in VisMode::ALL {
            let out = pipeline.process(mode, &[]);
            assert!(out.is_empty(), "{mode} should be empty");
        }
    }

    #[test]
    fn heatmap_rows_are_tissues() {
        let rows = vec![
            ResultRow::new()
                .with("diseaseLabel", "asthma")
                .with("tissueLabel", "lung")
                .with("geneCount", "4"),
        ];
        let out = Pipeline::default().process(VisMode::Heatmap, &rows);
        let Visualization::Matrix(matrix) = out else {
            panic!("expected a matrix");
        };
        assert_eq!(matrix.row_labels, vec!["lung"]);
        assert_eq!(matrix.column_labels, vec!["asthma"]);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let out = Pipeline::default().process(VisMode::Bar, &[]);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["kind"], "series");
        assert!(json["data"]["labels"].as_array().unwrap().is_empty());
    }
}
