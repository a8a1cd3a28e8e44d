use serde::Serialize;

use crate::aggregate::Totals;
use crate::normalize::DiseaseTissueRow;

pub const SIZE_PER_GENE: i64 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BubblePoint {
    pub disease: String,
    pub tissue: String,
    pub gene_count: i64,
    pub size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleChart {
    pub points: Vec<BubblePoint>,
    pub top_diseases: Vec<String>,
    pub top_tissues: Vec<String>,
}

impl BubbleChart {
    pub fn build(rows: &[DiseaseTissueRow], top_n: usize) -> Self {
        let disease_totals = Totals::accumulate(
            rows,
            |row| row.disease_label.as_str(),
            |row| row.gene_count,
        );
        let tissue_totals =
            Totals::accumulate(rows, |row| row.tissue_label.as_str(), |row| row.gene_count);
        let top_diseases = disease_totals.top_n(top_n);
        let top_tissues = tissue_totals.top_n(top_n);

        let points = rows
            .iter()
            .filter(|row| {
                top_diseases.contains(&row.disease_label) && top_tissues.contains(&row.tissue_label)
            })
            .map(|row| BubblePoint {
                disease: row.disease_label.clone(),
                tissue: row.tissue_label.clone(),
                gene_count: row.gene_count,
                size: row.gene_count.saturating_mul(SIZE_PER_GENE),
            })
            .collect();

        Self {
            points,
            top_diseases,
            top_tissues,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
