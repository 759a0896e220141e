//! Shared case context and user-prompt assembly.

use serde::Serialize;

use facttrace_core::{PreAnalysis, Transcript, TrustWeights};

/// Fixed context every debate turn sees: claim, truth, evidence, pre-analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseContext {
    claim: String,
    truth: String,
    evidence: Option<String>,
    analysis: Option<PreAnalysis>,
}

impl CaseContext {
    pub fn new(claim: impl Into<String>, truth: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            truth: truth.into(),
            evidence: None,
            analysis: None,
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    pub fn with_analysis(mut self, analysis: PreAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn claim(&self) -> &str {
        &self.claim
    }

    pub fn truth(&self) -> &str {
        &self.truth
    }

    pub fn analysis(&self) -> Option<&PreAnalysis> {
        self.analysis.as_ref()
    }

    /// Claim, truth, and whichever of evidence and pre-analysis are present.
    pub fn render(&self) -> String {
        let mut out = format!("CLAIM:\n{}\n\nSOURCE TRUTH:\n{}", self.claim, self.truth);

        if let Some(evidence) = &self.evidence {
            out.push_str("\n\nEvidence:\n");
            out.push_str(evidence);
        }

        if let Some(analysis) = &self.analysis {
            out.push_str("\n\nPRE-ANALYSIS:\n");
            out.push_str(&render_analysis(analysis));
        }

        out
    }

    /// Shared context followed by the accumulated debate history.
    pub fn with_history(&self, history: &str) -> String {
        format!("{}\n\nDebate History:\n{}", self.render(), history)
    }
}

fn render_analysis(analysis: &PreAnalysis) -> String {
    format!(
        "[Claim Analysis]:\n{}\n\n[Truth Analysis]:\n{}",
        analysis.claim_analysis, analysis.truth_analysis
    )
}

#[derive(Serialize)]
struct ConversationLine<'a> {
    agent: &'a str,
    message: &'a str,
}

/// User prompt shared by every juror (or the single judge).
///
/// The conversation is rendered without timestamps so identical runs yield
/// identical prompts.
pub fn judge_prompt(
    context: &CaseContext,
    transcript: &Transcript,
    trust_weights: Option<&TrustWeights>,
) -> String {
    let conversation: Vec<ConversationLine<'_>> = transcript
        .iter()
        .map(|entry| ConversationLine {
            agent: entry.role().display_name(),
            message: entry.text(),
        })
        .collect();
    let conversation_json =
        serde_json::to_string_pretty(&conversation).unwrap_or_else(|_| "[]".to_string());

    let mut out = format!(
        "CLAIM:\n{}\n\nSOURCE TRUTH:\n{}\n\n",
        context.claim, context.truth
    );

    if let Some(weights) = trust_weights {
        let weights_json =
            serde_json::to_string_pretty(&weights.weights).unwrap_or_else(|_| "{}".to_string());
        out.push_str(&format!(
            "Claim Type: {}\nTrust Weights:\n{}\n\n",
            weights.claim_type, weights_json
        ));
    }

    if let Some(analysis) = &context.analysis {
        out.push_str("Pre-Analysis:\n");
        out.push_str(&render_analysis(analysis));
        out.push_str("\n\n");
    }

    out.push_str("Full Conversation:\n");
    out.push_str(&conversation_json);
    out.push_str("\n\nReturn JSON with \"decision\", \"confidence\", \"summary\", \"disclaimers\".");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use facttrace_core::{AgentRole, TranscriptEntry};

    fn analysis() -> PreAnalysis {
        PreAnalysis {
            claim_analysis: "- states **over 10%**".to_string(),
            truth_analysis: "- **approximately 8.5%**".to_string(),
        }
    }

    #[test]
    fn test_render_minimal() {
        let context = CaseContext::new("C", "T");
        assert_eq!(context.render(), "CLAIM:\nC\n\nSOURCE TRUTH:\nT");
    }

    #[test]
    fn test_render_full_context_order() {
        let context = CaseContext::new("C", "T")
            .with_evidence("E")
            .with_analysis(analysis());
        let rendered = context.render();

        let evidence_at = rendered.find("Evidence:\nE").unwrap();
        let analysis_at = rendered.find("[Claim Analysis]").unwrap();
        assert!(evidence_at < analysis_at);
        assert!(rendered.contains("[Truth Analysis]:\n- **approximately 8.5%**"));
    }

    #[test]
    fn test_with_history_appends_history_last() {
        let context = CaseContext::new("C", "T");
        let prompt = context.with_history("\n[Advocate]: yes\n");
        assert!(prompt.ends_with("Debate History:\n\n[Advocate]: yes\n"));
    }

    #[test]
    fn test_judge_prompt_contains_conversation_without_timestamps() {
        let context = CaseContext::new("C", "T").with_analysis(analysis());
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEntry::new(AgentRole::Advocate, "faithful enough"));
        transcript.push(TranscriptEntry::new(AgentRole::FactChecker, "**Exaggerated**"));

        let prompt = judge_prompt(&context, &transcript, None);
        assert!(prompt.contains("\"agent\": \"Fact-Checker\""));
        assert!(prompt.contains("\"message\": \"faithful enough\""));
        assert!(!prompt.contains("emitted_at"));
        assert!(prompt.contains("Pre-Analysis:\n[Claim Analysis]"));
        assert!(!prompt.contains("Trust Weights"));
        assert!(prompt.ends_with("\"disclaimers\"."));
    }

    #[test]
    fn test_judge_prompt_includes_trust_weights() {
        let context = CaseContext::new("C", "T");
        let weights = TrustWeights::fallback();
        let prompt = judge_prompt(&context, &Transcript::new(), Some(&weights));
        assert!(prompt.contains("Claim Type: General"));
        assert!(prompt.contains("\"skeptic\": 0.2"));
    }
}
