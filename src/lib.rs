//! Linkscout Core Library
//!
//! This library discovers and ranks candidate download/purchase links for a
//! named file (e.g. a book) by querying web search engines and verifying
//! each candidate through a two-tier pipeline: a fast header probe for
//! direct file links, and a full page fetch plus content classification
//! for ambiguous pages.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`model`] - Request and result types shared across the pipeline
//! - [`source`] - Search-engine link sources with ordered fallback
//! - [`probe`] - Header-only fast verification of candidate URLs
//! - [`audit`] - Page rendering and content classification of candidates
//! - [`analysis`] - Concurrent per-candidate orchestration and ranking

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod audit;
pub mod model;
pub mod probe;
pub mod source;
mod user_agent;

// Re-export commonly used types
pub use analysis::{Analyzer, PROBED_TRUST_SCORE};
pub use audit::DeepAuditor;
pub use audit::oracle::{
    ContentOracle, FallbackPolicy, GeminiOracle, OracleError, Verdict, VerdictStatus,
};
pub use audit::render::{
    RenderEngine, RenderError, RenderRequest, RenderedPage, StaticRenderer, WaitMode,
};
pub use model::{Candidate, SearchMode, SearchRequest, VerificationOutcome};
pub use probe::{HeadProbe, ProbeVerdict};
pub use source::{
    DuckDuckGoSource, GoogleSource, LinkSource, SourceChain, SourceError,
    build_default_source_chain,
};
