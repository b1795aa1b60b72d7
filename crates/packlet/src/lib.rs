//! Bundles a graph of ES modules into a single self-contained script
//!
//! The pipeline is [`graph_builder`] (discovery and identity assignment),
//! then [`code_generator`] (artifact synthesis), driven by
//! [`orchestrator::Bundler`] from a [`config::Config`].

pub mod analyzer;
pub mod code_generator;
pub mod config;
pub mod error;
pub mod graph_builder;
pub mod module_graph;
pub mod orchestrator;
pub mod resolver;
pub mod types;
pub mod util;
