// toxiscan: batch toxicity classification of comments through a hosted LLM
//
// This is the library root. Each module corresponds to one stage of the
// analysis: load, clean and classify, aggregate, report.

pub mod classifier;
pub mod completion;
pub mod config;
pub mod input;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod stats;

#[cfg(feature = "web")]
pub mod web;
