//! Debate Engine.
//!
//! Each round is a fixed turn order: Advocate, Skeptic, then Mediator when
//! enabled. Every turn sees the shared context plus the entire history of
//! earlier turns. History is never pruned, so prompt size grows with every
//! turn; the engine logs it at debug level.
//!
//! The engine is a small state machine driven by [`DebateEngine::step`], so
//! the orchestrator can emit each entry as soon as it exists.

use tracing::{debug, info};

use facttrace_core::{AgentRole, TranscriptEntry};

use crate::agents::PersonaRunner;
use crate::context::CaseContext;
use crate::personas::Persona;

/// Plain-text debate history: `"\n[Role]: text\n"` per turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebateHistory(String);

impl DebateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: AgentRole, text: &str) {
        self.0.push_str(&format!("\n[{}]: {}\n", role.display_name(), text));
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Debate state: next round, next turn, accumulated history.
#[derive(Debug, Clone)]
pub struct DebateEngine {
    rounds: u32,
    turns: Vec<Persona>,
    round: u32,
    turn: usize,
    history: DebateHistory,
}

impl DebateEngine {
    pub fn new(rounds: u32, mediator: bool) -> Self {
        let mut turns = vec![Persona::Advocate, Persona::Skeptic];
        if mediator {
            turns.push(Persona::Mediator);
        }
        Self {
            rounds,
            turns,
            round: 0,
            turn: 0,
            history: DebateHistory::new(),
        }
    }

    pub fn turns_per_round(&self) -> usize {
        self.turns.len()
    }

    /// Entries the full debate will produce.
    pub fn total_turns(&self) -> usize {
        self.rounds as usize * self.turns.len()
    }

    pub fn is_finished(&self) -> bool {
        self.round >= self.rounds
    }

    pub fn history(&self) -> &DebateHistory {
        &self.history
    }

    /// Run the next turn. `None` once every round is done.
    pub async fn step(
        &mut self,
        runner: &PersonaRunner,
        context: &CaseContext,
    ) -> Option<TranscriptEntry> {
        if self.is_finished() {
            return None;
        }

        let persona = self.turns[self.turn];
        let role = persona.role()?;
        if self.turn == 0 {
            info!(round = self.round + 1, rounds = self.rounds, "Debate round");
        }

        let prompt = context.with_history(self.history.as_str());
        debug!(
            persona = %persona,
            round = self.round + 1,
            prompt_chars = prompt.len(),
            "Debate turn"
        );

        let text = runner.speak(persona, &prompt).await;
        self.history.push(role, &text);

        self.turn += 1;
        if self.turn == self.turns.len() {
            self.turn = 0;
            self.round += 1;
        }

        Some(TranscriptEntry::new(role, text))
    }

    /// Run every remaining turn.
    pub async fn run(
        &mut self,
        runner: &PersonaRunner,
        context: &CaseContext,
    ) -> Vec<TranscriptEntry> {
        let mut entries = Vec::with_capacity(self.total_turns());
        while let Some(entry) = self.step(runner, context).await {
            entries.push(entry);
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::{runner, RoleEcho};

    #[test]
    fn test_history_format() {
        let mut history = DebateHistory::new();
        history.push(AgentRole::Advocate, "yes");
        history.push(AgentRole::Skeptic, "no");
        assert_eq!(history.as_str(), "\n[Advocate]: yes\n\n[Skeptic]: no\n");
    }

    #[tokio::test]
    async fn test_entry_count_without_mediator() {
        let (runner, _) = runner(RoleEcho::default());
        let mut engine = DebateEngine::new(3, false);
        let entries = engine.run(&runner, &CaseContext::new("C", "T")).await;

        assert_eq!(entries.len(), 6);
        let roles: Vec<AgentRole> = entries.iter().map(|e| e.role()).collect();
        assert_eq!(&roles[..2], &[AgentRole::Advocate, AgentRole::Skeptic]);
        assert!(engine.is_finished());
    }

    #[tokio::test]
    async fn test_entry_count_with_mediator() {
        let (runner, _) = runner(RoleEcho::default());
        let mut engine = DebateEngine::new(2, true);
        let entries = engine.run(&runner, &CaseContext::new("C", "T")).await;

        assert_eq!(entries.len(), 6);
        assert_eq!(entries[2].role(), AgentRole::Mediator);
        assert_eq!(entries[5].role(), AgentRole::Mediator);
    }

    #[tokio::test]
    async fn test_zero_rounds() {
        let (runner, provider) = runner(RoleEcho::default());
        let mut engine = DebateEngine::new(0, false);
        assert!(engine.run(&runner, &CaseContext::new("C", "T")).await.is_empty());
        assert!(provider.user_prompts().is_empty());
    }

    #[tokio::test]
    async fn test_each_turn_sees_all_prior_turns() {
        let (runner, provider) = runner(RoleEcho::default());
        let mut engine = DebateEngine::new(2, false);
        engine.run(&runner, &CaseContext::new("C", "T")).await;

        let prompts = provider.user_prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].ends_with("Debate History:\n"));
        assert!(prompts[1].ends_with("\n[Advocate]: Advocate says\n"));
        assert!(prompts[3].contains(
            "\n[Advocate]: Advocate says\n\n[Skeptic]: Skeptic says\n\n[Advocate]: Advocate says\n"
        ));
        // Monotonic growth
        assert!(prompts.windows(2).all(|w| w[1].len() > w[0].len()));
        assert_eq!(engine.history().as_str().matches("[Skeptic]").count(), 2);
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_debate_going() {
        let (runner, _) = runner(RoleEcho::default().fail(Persona::Skeptic));
        let mut engine = DebateEngine::new(1, false);
        let entries = engine.run(&runner, &CaseContext::new("C", "T")).await;

        assert_eq!(entries.len(), 2);
        assert!(entries[1].text().starts_with("[Skeptic unavailable: "));
    }
}
