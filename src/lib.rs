pub mod aggregate;
pub mod app;
pub mod binding;
pub mod bubble;
pub mod cache;
pub mod config;
pub mod domain;
pub mod ensembl;
pub mod error;
pub mod matrix;
pub mod normalize;
pub mod orthologs;
pub mod output;
pub mod queries;
pub mod reshape;
pub mod series;
pub mod similarity;
pub mod sparql;
pub mod species;
