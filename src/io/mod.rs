//! File input/output: CSV ingest, prediction exports, fit JSON.

pub mod export;
pub mod fit_file;
pub mod ingest;
