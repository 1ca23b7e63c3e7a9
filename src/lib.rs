pub mod cli;
pub mod config;
pub mod lexicon;
pub mod metrics;
pub mod retrieval;
pub mod storage;
pub mod text;
