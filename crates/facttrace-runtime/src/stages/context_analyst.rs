//! Context analyst: does framing or background change the reading?

use tracing::info;

use facttrace_core::{AgentRole, TranscriptEntry};

use crate::agents::PersonaRunner;
use crate::context::CaseContext;
use crate::personas::Persona;

pub async fn analyze(runner: &PersonaRunner, context: &CaseContext) -> TranscriptEntry {
    info!("Stage: context analyst");
    let prompt = format!(
        "CLAIM:\n{}\n\nSOURCE TRUTH:\n{}",
        context.claim(),
        context.truth()
    );
    let text = runner.speak(Persona::ContextAnalyst, &prompt).await;
    TranscriptEntry::new(AgentRole::ContextAnalyst, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::{runner, RoleEcho};

    #[tokio::test]
    async fn test_context_entry() {
        let (runner, _) = runner(RoleEcho::default());
        let entry = analyze(&runner, &CaseContext::new("C", "T")).await;
        assert_eq!(entry.role(), AgentRole::ContextAnalyst);
        assert_eq!(entry.text(), "Context Analyst says");
    }
}
