use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum VisError {
    #[error("invalid visualization mode: {0}")]
    InvalidMode(String),

    #[error("invalid search mode: {0}")]
    InvalidSearchMode(String),

    #[error("invalid Wikidata entity id: {0}")]
    InvalidEntityId(String),

    #[error("invalid Ensembl gene id: {0}")]
    InvalidEnsemblId(String),

    #[error("missing config file ortholog-vis.json")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    ConfigValue(String),

    #[error("SPARQL request failed: {0}")]
    SparqlHttp(String),

    #[error("SPARQL ({mode}) returned status {status}: {message}")]
    SparqlStatus {
        mode: String,
        status: u16,
        message: String,
    },

    #[error("Ensembl request failed: {0}")]
    EnsemblHttp(String),

    #[error("Ensembl returned status {status}: {message}")]
    EnsemblStatus { status: u16, message: String },

    #[error("failed to write output: {0}")]
    Output(String),

    #[error("processing failed: {0}")]
    Processing(String),
}

impl VisError {
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            VisError::SparqlHttp(_)
                | VisError::SparqlStatus { .. }
                | VisError::EnsemblHttp(_)
                | VisError::EnsemblStatus { .. }
        )
    }
}
