//! Fact-checker: one neutral comparison over the whole debate.

use tracing::info;

use facttrace_core::{AgentRole, TranscriptEntry};

use crate::agents::PersonaRunner;
use crate::context::CaseContext;
use crate::personas::Persona;

pub async fn check(runner: &PersonaRunner, context: &CaseContext, history: &str) -> TranscriptEntry {
    info!("Stage: fact-check");
    let text = runner
        .speak(Persona::FactChecker, &context.with_history(history))
        .await;
    TranscriptEntry::new(AgentRole::FactChecker, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::{runner, RoleEcho};

    #[tokio::test]
    async fn test_fact_check_sees_full_history() {
        let (runner, provider) = runner(RoleEcho::default());
        let context = CaseContext::new("C", "T").with_evidence("E");
        let history = "\n[Advocate]: a\n\n[Skeptic]: s\n";

        let entry = check(&runner, &context, history).await;
        assert_eq!(entry.role(), AgentRole::FactChecker);
        assert!(provider.last_user_prompt().ends_with(history));
        assert!(provider.last_user_prompt().contains("Evidence:\nE"));
    }
}
