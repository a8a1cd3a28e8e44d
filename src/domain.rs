use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::VisError;

static ENTITY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Q\d+$").unwrap());
static ENSEMBL_GENE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ENS[A-Z]*G\d{11}(\.\d+)?$").unwrap());

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum VisMode {
    #[default]
    Graph,
    GroupedBar,
    Bar,
    Bubble,
    Heatmap,
}

impl VisMode {
    pub const ALL: [VisMode; 5] = [
        VisMode::Graph,
        VisMode::GroupedBar,
        VisMode::Bar,
        VisMode::Bubble,
        VisMode::Heatmap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisMode::Graph => "graph",
            VisMode::GroupedBar => "grouped-bar",
            VisMode::Bar => "bar",
            VisMode::Bubble => "bubble",
            VisMode::Heatmap => "heatmap",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            VisMode::Graph => "Disease similarity by shared GO terms",
            VisMode::GroupedBar => "GO annotations per disease across ortholog species",
            VisMode::Bar => "Ortholog support per model organism",
            VisMode::Bubble => "Disease–tissue gene clusters (bubble matrix)",
            VisMode::Heatmap => "Disease–tissue gene clusters (heatmap)",
        }
    }
}

impl fmt::Display for VisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VisMode {
    type Err = VisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "graph" => Ok(VisMode::Graph),
            "grouped-bar" | "grouped-bar-chart" => Ok(VisMode::GroupedBar),
            "bar" => Ok(VisMode::Bar),
            "bubble" => Ok(VisMode::Bubble),
            "heatmap" => Ok(VisMode::Heatmap),
            _ => Err(VisError::InvalidMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Disease,
    Gene,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Disease => write!(f, "disease"),
            SearchMode::Gene => write!(f, "gene"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = VisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "disease" => Ok(SearchMode::Disease),
            "gene" => Ok(SearchMode::Gene),
            _ => Err(VisError::InvalidSearchMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelOrder {
    FirstSeen,
    #[default]
    #[serde(rename = "total", alias = "total-descending")]
    TotalDescending,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_iri(value: &str) -> Result<Self, VisError> {
        let tail = value.trim().rsplit('/').next().unwrap_or_default();
        tail.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = VisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        if !ENTITY_ID.is_match(&normalized) {
            return Err(VisError::InvalidEntityId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnsemblGeneId(String);

impl EnsemblGeneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnsemblGeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EnsemblGeneId {
    type Err = VisError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        if !ENSEMBL_GENE_ID.is_match(&normalized) {
            return Err(VisError::InvalidEnsemblId(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_mode_aliases() {
        assert_eq!("grouped_bar_chart".parse::<VisMode>().unwrap(), VisMode::GroupedBar);
        assert_eq!("Heatmap".parse::<VisMode>().unwrap(), VisMode::Heatmap);
        assert_matches!("pie".parse::<VisMode>(), Err(VisError::InvalidMode(_)));
    }

    #[test]
    fn mode_display_round_trips() {
        for mode in VisMode::ALL {
            assert_eq!(mode.to_string().parse::<VisMode>().unwrap(), mode);
        }
    }

    #[test]
    fn entity_id_from_iri() {
        let id = EntityId::from_iri("http://www.wikidata.org/entity/Q12174").unwrap();
        assert_eq!(id.as_str(), "Q12174");
        assert_matches!(
            EntityId::from_iri("http://www.wikidata.org/entity/P703"),
            Err(VisError::InvalidEntityId(_))
        );
    }

    #[test]
    fn ensembl_ids() {
        let human: EnsemblGeneId = "ENSG00000139618".parse().unwrap();
        assert_eq!(human.as_str(), "ENSG00000139618");
        let rat: EnsemblGeneId = "ensrnog00000001234.2".parse().unwrap();
        assert_eq!(rat.as_str(), "ENSRNOG00000001234.2");
        assert_matches!(
            "BRCA2".parse::<EnsemblGeneId>(),
            Err(VisError::InvalidEnsemblId(_))
        );
    }
}
