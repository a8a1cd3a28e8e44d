use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::aggregate::Totals;
use crate::binding::ResultRow;
use crate::domain::{EnsemblGeneId, SearchMode};
use crate::ensembl::{ratio_from_counts, transcript_count, transcript_score};
use crate::normalize::fields;

pub const DEFAULT_SCORE_LIMIT: usize = 200;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 50;
pub const DEFAULT_DISEASE_BARS: usize = 15;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrthologPair {
    pub disease_label: String,
    pub human_gene: String,
    pub human_gene_label: String,
    pub human_ensembl: String,
    pub rat_gene: String,
    pub rat_gene_label: String,
    pub rat_ensembl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_transcripts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rat_transcripts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseGeneCount {
    pub disease: String,
    pub human_count: usize,
    pub rat_count: usize,
    pub total: usize,
}

pub fn ortholog_pairs(rows: &[ResultRow]) -> Vec<OrthologPair> {
    rows.iter()
        .map(|row| OrthologPair {
            disease_label: row.text(fields::PAIR_DISEASE_LABEL),
            human_gene: row.text(fields::HUMAN_GENE),
            human_gene_label: row.text(fields::HUMAN_GENE_LABEL),
            human_ensembl: row.text(fields::HUMAN_ENSEMBL),
            rat_gene: row.text(fields::RAT_GENE),
            rat_gene_label: row.text(fields::RAT_GENE_LABEL),
            rat_ensembl: row.text(fields::RAT_ENSEMBL),
            ..OrthologPair::default()
        })
        .collect()
}

pub fn filter_pairs<'a>(
    pairs: &'a [OrthologPair],
    query: &str,
    mode: SearchMode,
) -> Vec<&'a OrthologPair> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return pairs.iter().collect();
    }
    pairs
        .iter()
        .filter(|pair| match mode {
            SearchMode::Disease => pair.disease_label.to_lowercase().contains(&needle),
            SearchMode::Gene => {
                pair.human_gene_label.to_lowercase().contains(&needle)
                    || pair.rat_gene_label.to_lowercase().contains(&needle)
            }
        })
        .collect()
}

pub fn disease_suggestions(pairs: &[OrthologPair], query: &str, limit: usize) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    let labels: IndexSet<&str> = pairs
        .iter()
        .map(|pair| pair.disease_label.as_str())
        .filter(|label| !label.is_empty())
        .collect();
    labels
        .into_iter()
        .filter(|label| label.to_lowercase().contains(&needle))
        .take(limit)
        .map(str::to_string)
        .collect()
}

pub fn disease_gene_counts(pairs: &[&OrthologPair], top_n: usize) -> Vec<DiseaseGeneCount> {
    let mut genes: IndexMap<&str, (IndexSet<&str>, IndexSet<&str>)> = IndexMap::new();
    for pair in pairs {
        if pair.disease_label.is_empty() {
            continue;
        }
        let (humans, rats) = genes.entry(pair.disease_label.as_str()).or_default();
        let human = gene_name(&pair.human_gene_label, &pair.human_gene);
        if !human.is_empty() {
            humans.insert(human);
        }
        let rat = gene_name(&pair.rat_gene_label, &pair.rat_gene);
        if !rat.is_empty() {
            rats.insert(rat);
        }
    }

    let mut totals = Totals::new();
    for (disease, (humans, rats)) in &genes {
        totals.add(disease, (humans.len() + rats.len()) as i64);
    }
    totals
        .top_n(top_n)
        .into_iter()
        .filter_map(|disease| {
            let (humans, rats) = genes.get(disease.as_str())?;
            Some(DiseaseGeneCount {
                human_count: humans.len(),
                rat_count: rats.len(),
                total: humans.len() + rats.len(),
                disease,
            })
        })
        .collect()
}

fn gene_name<'a>(label: &'a str, entity: &'a str) -> &'a str {
    if label.is_empty() { entity } else { label }
}

pub fn ensembl_ids(pairs: &[OrthologPair], max_rows: usize) -> Vec<String> {
    let mut ids = IndexSet::new();
    for pair in pairs.iter().take(max_rows) {
        for raw in [&pair.human_ensembl, &pair.rat_ensembl] {
            if raw.is_empty() {
                continue;
            }
            match raw.parse::<EnsemblGeneId>() {
                Ok(id) => {
                    ids.insert(id.to_string());
                }
                Err(err) => debug!(error = %err, "skipping Ensembl lookup"),
            }
        }
    }
    ids.into_iter().collect()
}

pub fn score_pairs(
    pairs: &mut [OrthologPair],
    lookups: &HashMap<String, Option<Value>>,
    max_rows: usize,
) -> usize {
    let lookup = |raw: &str| lookups.get(&lookup_key(raw)).and_then(Option::as_ref);
    let mut scored = 0;
    for pair in pairs.iter_mut().take(max_rows) {
        let human = transcript_count(lookup(&pair.human_ensembl));
        let rat = transcript_count(lookup(&pair.rat_ensembl));
        let score = transcript_score(ratio_from_counts(human, rat));
        pair.human_transcripts = Some(human);
        pair.rat_transcripts = Some(rat);
        pair.transcript_score = Some((score * 1000.0).round() / 1000.0);
        scored += 1;
    }
    scored
}

fn lookup_key(raw: &str) -> String {
    match raw.parse::<EnsemblGeneId>() {
        Ok(id) => id.to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pair(disease: &str, human: &str, rat: &str) -> OrthologPair {
        OrthologPair {
            disease_label: disease.to_string(),
            human_gene_label: human.to_string(),
            rat_gene_label: rat.to_string(),
            human_ensembl: format!("ENSG-{human}"),
            rat_ensembl: format!("ENSRNOG-{rat}"),
            ..OrthologPair::default()
        }
    }

    fn sample() -> Vec<OrthologPair> {
        vec![
            pair("Alzheimer's disease", "APOE", "Apoe"),
            pair("obesity", "LEP", "Lep"),
            pair("Alzheimer's disease", "APP", "App"),
            pair("", "X", "x"),
        ]
    }

    #[test]
    fn normalizes_rows() {
        let rows = vec![
            ResultRow::new()
                .with("humanGeneLabel", "LEP")
                .with("ratGeneLabel", "Lep")
                .with("diseaseLabel", "obesity"),
        ];
        let pairs = ortholog_pairs(&rows);
        assert_eq!(pairs[0].human_gene_label, "LEP");
        assert_eq!(pairs[0].human_ensembl, "");
        assert_eq!(pairs[0].transcript_score, None);
    }

    #[test]
    fn filter_by_disease_and_gene() {
        let pairs = sample();
        assert_eq!(filter_pairs(&pairs, "", SearchMode::Disease).len(), 4);
        assert_eq!(filter_pairs(&pairs, "ALZ", SearchMode::Disease).len(), 2);
        let genes = filter_pairs(&pairs, "lep", SearchMode::Gene);
        assert_eq!(genes.len(), 1);
        assert_eq!(genes[0].disease_label, "obesity");
        assert!(filter_pairs(&pairs, "lep", SearchMode::Disease).is_empty());
    }

    #[test]
    fn suggestions_are_distinct_and_capped() {
        let pairs = sample();
        assert_eq!(
            disease_suggestions(&pairs, "", 10),
            vec!["Alzheimer's disease", "obesity"]
        );
        assert_eq!(disease_suggestions(&pairs, "o", 1), vec!["obesity"]);
    }

    #[test]
    fn scoring_uses_lookups() {
        let mut pairs = sample();
        let mut lookups = HashMap::new();
        lookups.insert(
            "ENSG-APOE".to_string(),
            Some(json!({"Transcript": [1, 2, 3, 4]})),
        );
        lookups.insert("ENSRNOG-Apoe".to_string(), Some(json!({"Transcript": [1, 2, 3]})));
        lookups.insert("ENSG-LEP".to_string(), None);
        let scored = score_pairs(&mut pairs, &lookups, 2);
        assert_eq!(scored, 2);
        assert_eq!(pairs[0].human_transcripts, Some(4));
        assert_eq!(pairs[0].rat_transcripts, Some(3));
        // ratio 0.75 -> 0.75
        assert_eq!(pairs[0].transcript_score, Some(0.75));
        assert_eq!(pairs[1].transcript_score, Some(0.0));
        assert_eq!(pairs[2].transcript_score, None);
    }

    #[test]
    fn gene_counts_per_disease() {
        let mut pairs = sample();
        pairs.push(pair("obesity", "LEP", "Lep"));
        pairs.push(pair("obesity", "LEPR", "Lepr"));
        pairs.push(pair("gout", "SLC2A9", ""));
        pairs.push(pair("Alzheimer's disease", "APOE", "Apoe2"));
        let refs: Vec<&OrthologPair> = pairs.iter().collect();

        let counts = disease_gene_counts(&refs, 15);
        assert_eq!(
            counts,
            vec![
                DiseaseGeneCount {
                    disease: "Alzheimer's disease".to_string(),
                    human_count: 2,
                    rat_count: 3,
                    total: 5,
                },
                DiseaseGeneCount {
                    disease: "obesity".to_string(),
                    human_count: 2,
                    rat_count: 2,
                    total: 4,
                },
                DiseaseGeneCount {
                    disease: "gout".to_string(),
                    human_count: 1,
                    rat_count: 0,
                    total: 1,
                },
            ]
        );
        assert_eq!(disease_gene_counts(&refs, 1).len(), 1);
        assert!(disease_gene_counts(&[], 15).is_empty());
    }

    #[test]
    fn gene_count_ties_keep_first_seen_order() {
        let pairs = vec![pair("b", "G1", "g1"), pair("a", "G2", "g2")];
        let refs: Vec<&OrthologPair> = pairs.iter().collect();
        let diseases: Vec<String> = disease_gene_counts(&refs, 15)
            .into_iter()
            .map(|count| count.disease)
            .collect();
        assert_eq!(diseases, vec!["b", "a"]);
    }

    #[test]
    fn ids_are_validated_and_deduplicated() {
        let with_ids = |human: &str, rat: &str| OrthologPair {
            human_ensembl: human.to_string(),
            rat_ensembl: rat.to_string(),
            ..OrthologPair::default()
        };
        let pairs = vec![
            with_ids("ENSG00000130203", "ENSRNOG00000018454"),
            with_ids("ENSG00000130203", ""),
            with_ids("not-an-id", "ENSRNOG00000000001"),
        ];
        assert_eq!(
            ensembl_ids(&pairs, 10),
            vec!["ENSG00000130203", "ENSRNOG00000018454", "ENSRNOG00000000001"]
        );
        assert_eq!(ensembl_ids(&pairs, 1).len(), 2);
    }

    #[test]
    fn scoring_matches_ids_case_insensitively() {
        let mut pairs = vec![OrthologPair {
            human_ensembl: " ensg00000130203".to_string(),
            rat_ensembl: "ENSRNOG00000018454".to_string(),
            ..OrthologPair::default()
        }];
        let ids = ensembl_ids(&pairs, 10);
        assert_eq!(ids, vec!["ENSG00000130203", "ENSRNOG00000018454"]);

        let mut lookups = HashMap::new();
        lookups.insert(ids[0].clone(), Some(json!({"Transcript": [1, 2, 3]})));
        lookups.insert(ids[1].clone(), Some(json!({"Transcript": [1, 2, 3]})));
        score_pairs(&mut pairs, &lookups, 10);
        assert_eq!(pairs[0].human_transcripts, Some(3));
        assert_eq!(pairs[0].transcript_score, Some(1.0));
    }
}
