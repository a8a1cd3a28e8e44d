use serde::Serialize;

use crate::binding::ResultRow;
use crate::domain::EntityId;

pub mod fields {
    pub const DISEASE_ID: &[&str] = &["disease", "diseaseLabel"];
    pub const DISEASE_LABEL: &[&str] = &["diseaseLabel", "disease"];
    pub const GO_TERM: &[&str] = &["goTerm"];
    pub const GO_TERM_LABEL: &[&str] = &["goTermLabel"];
    pub const SUPPORTING_SPECIES: &[&str] = &["supportingSpecies"];
    pub const SPECIES_LABEL: &[&str] = &["orthologSpeciesLabel", "speciesLabel", "species"];
    pub const GO_ANNOTATION_COUNT: &[&str] = &["goAnnotationCount", "count"];
    pub const TISSUE_LABEL: &[&str] = &["tissueLabel", "tissue"];
    pub const GENE_COUNT: &[&str] = &["geneCount", "count"];
    pub const BAR_LABEL: &[&str] = &["speciesLabel", "diseaseLabel", "label"];
    pub const BAR_COUNT: &[&str] = &["orthologCount", "geneCount", "count"];
    pub const HUMAN_GENE: &[&str] = &["humanGene"];
    pub const HUMAN_GENE_LABEL: &[&str] = &["humanGeneLabel"];
    pub const HUMAN_ENSEMBL: &[&str] = &["humanEnsembl"];
    pub const RAT_GENE: &[&str] = &["ratGene"];
    pub const RAT_GENE_LABEL: &[&str] = &["ratGeneLabel"];
    pub const RAT_ENSEMBL: &[&str] = &["ratEnsembl"];
    pub const PAIR_DISEASE_LABEL: &[&str] = &["diseaseLabel"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseGoRow {
    pub disease_id: String,
    pub disease_label: String,
    pub go_term: String,
    pub go_term_label: String,
    pub supporting_species: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesDiseaseRow {
    pub species_label: String,
    pub disease_label: String,
    pub go_annotation_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseTissueRow {
    pub disease_label: String,
    pub tissue_label: String,
    pub gene_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCountRow {
    pub label: String,
    pub count: i64,
}

pub fn disease_go_rows(rows: &[ResultRow]) -> Vec<DiseaseGoRow> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let mut disease_id = shorten_entity(row.non_empty_text(fields::DISEASE_ID));
            if disease_id.is_empty() {
                disease_id = format!("unknown-{index}");
            }
            let mut disease_label = row.non_empty_text(fields::DISEASE_LABEL);
            if disease_label.is_empty() {
                disease_label = disease_id.clone();
            }
            DiseaseGoRow {
                disease_id,
                disease_label,
                go_term: shorten_entity(row.text(fields::GO_TERM)),
                go_term_label: row.text(fields::GO_TERM_LABEL),
                supporting_species: row.integer(fields::SUPPORTING_SPECIES),
            }
        })
        .collect()
}

fn shorten_entity(value: String) -> String {
    match EntityId::from_iri(&value) {
        Ok(id) => id.to_string(),
        Err(_) => value,
    }
}

pub fn species_disease_rows(rows: &[ResultRow]) -> Vec<SpeciesDiseaseRow> {
    rows.iter()
        .map(|row| SpeciesDiseaseRow {
            species_label: row.text(fields::SPECIES_LABEL),
            disease_label: row.text(fields::DISEASE_LABEL),
            go_annotation_count: row.integer(fields::GO_ANNOTATION_COUNT),
        })
        .collect()
}

pub fn disease_tissue_rows(rows: &[ResultRow]) -> Vec<DiseaseTissueRow> {
    rows.iter()
        .map(|row| DiseaseTissueRow {
            disease_label: row.text(fields::DISEASE_LABEL),
            tissue_label: row.text(fields::TISSUE_LABEL),
            gene_count: row.integer(fields::GENE_COUNT),
        })
        .collect()
}

pub fn label_count_rows(rows: &[ResultRow]) -> Vec<LabelCountRow> {
    rows.iter()
        .map(|row| LabelCountRow {
            label: row.text(fields::BAR_LABEL),
            count: row.integer(fields::BAR_COUNT),
        })
        .collect()
}
