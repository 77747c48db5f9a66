//! Concurrent per-candidate analysis and trust ranking.
//!
//! The [`Analyzer`] ties the pipeline together: fetch candidates from
//! the source chain, run the probe-then-audit pipeline over all of them
//! concurrently, keep only accepted outcomes, and rank by trust score.
//!
//! Candidate pipelines are independent futures joined by a fan-out/
//! fan-in barrier; completion order is irrelevant because the result
//! list is reordered deterministically by the final stable sort alone.

use futures_util::future::join_all;
use tracing::{debug, info};

use crate::audit::DeepAuditor;
use crate::model::{Candidate, SearchRequest, VerificationOutcome};
use crate::probe::HeadProbe;
use crate::source::SourceChain;

/// Trust assigned to probe-verified direct links.
///
/// Slightly below the probe's internal perfect score so header-probed
/// confidence stays distinguishable from a full audit's ceiling.
pub const PROBED_TRUST_SCORE: u8 = 98;

/// Title used for probe-verified links whose candidate had none.
const DIRECT_FILE_TITLE: &str = "Direct File";

/// Snippet reported for probe-verified links.
const DIRECT_FILE_SNIPPET: &str = "Verified direct download link";

/// Full search pipeline: sources, fast verifier, deep auditor.
///
/// The analyzer is request-scoped by convention: the auditor's render
/// engine is the shared per-search resource, acquired when the analyzer
/// is built and released when it is dropped - after every candidate
/// task has completed, regardless of individual failures.
pub struct Analyzer {
    sources: SourceChain,
    probe: HeadProbe,
    auditor: DeepAuditor,
}

impl Analyzer {
    /// Creates an analyzer from its three stages.
    #[must_use]
    pub fn new(sources: SourceChain, probe: HeadProbe, auditor: DeepAuditor) -> Self {
        Self {
            sources,
            probe,
            auditor,
        }
    }

    /// Runs one search: candidates in, ranked verified outcomes out.
    ///
    /// Never raises for partial failures; a fully empty result list is
    /// the only visible signal of total failure.
    #[tracing::instrument(
        skip(self, request),
        fields(filename = %request.filename, filetype = %request.filetype, mode = %request.mode)
    )]
    pub async fn run(&self, request: &SearchRequest) -> Vec<VerificationOutcome> {
        let candidates = self.sources.fetch_candidates(request).await;
        if candidates.is_empty() {
            debug!("No candidates to analyze");
            return Vec::new();
        }

        info!(candidates = candidates.len(), "Analyzing candidates");
        let pipelines = candidates
            .iter()
            .map(|candidate| self.analyze_candidate(candidate, request));
        let mut outcomes: Vec<VerificationOutcome> =
            join_all(pipelines).await.into_iter().flatten().collect();

        // Stable sort: ties keep candidate order.
        outcomes.sort_by(|a, b| b.trust_score.cmp(&a.trust_score));

        info!(accepted = outcomes.len(), "Analysis complete");
        outcomes
    }

    /// Runs the two-tier pipeline for one candidate.
    ///
    /// A perfect probe score synthesizes the outcome directly and the
    /// deep audit never runs for that candidate.
    async fn analyze_candidate(
        &self,
        candidate: &Candidate,
        request: &SearchRequest,
    ) -> Option<VerificationOutcome> {
        let verdict = self.probe.probe(&candidate.url, &request.filetype).await;
        if verdict.is_direct_hit() {
            debug!(
                url = %candidate.url,
                reason = verdict.reason.unwrap_or_default(),
                "Probe verified direct link"
            );
            let title = candidate
                .title
                .clone()
                .unwrap_or_else(|| DIRECT_FILE_TITLE.to_string());
            return Some(VerificationOutcome::new(
                title,
                &candidate.url,
                DIRECT_FILE_SNIPPET,
                PROBED_TRUST_SCORE,
                request.filetype.to_uppercase(),
            ));
        }

        self.auditor.audit(candidate, &request.filetype).await
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("sources", &self.sources)
            .field("auditor", &self.auditor)
            .finish_non_exhaustive()
    }
}
