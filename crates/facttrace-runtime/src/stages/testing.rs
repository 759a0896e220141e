//! Scripted provider shared by stage tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::agents::PersonaRunner;
use crate::config::RuntimeConfig;
use crate::gateway::Gateway;
use crate::personas::{Persona, PersonaTable};
use crate::providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};

enum Script {
    Fixed(String),
    Sequence(Vec<String>),
    Fail,
}

/// Answers each persona by recognizing its system prompt.
///
/// Unscripted personas reply `"<Persona> says"`. Sequences are consumed in
/// call order and repeat their last element.
#[derive(Default)]
pub(crate) struct RoleEcho {
    scripts: Mutex<BTreeMap<Persona, Script>>,
    user_prompts: Mutex<Vec<String>>,
    temperatures: Mutex<Vec<f32>>,
}

impl RoleEcho {
    pub(crate) fn respond(self, persona: Persona, text: &str) -> Self {
        self.scripts.lock().insert(persona, Script::Fixed(text.to_string()));
        self
    }

    pub(crate) fn respond_seq(self, persona: Persona, texts: &[&str]) -> Self {
        let mut texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        texts.reverse();
        self.scripts.lock().insert(persona, Script::Sequence(texts));
        self
    }

    pub(crate) fn fail(self, persona: Persona) -> Self {
        self.scripts.lock().insert(persona, Script::Fail);
        self
    }

    pub(crate) fn user_prompts(&self) -> Vec<String> {
        self.user_prompts.lock().clone()
    }

    pub(crate) fn last_user_prompt(&self) -> String {
        self.user_prompts.lock().last().cloned().unwrap_or_default()
    }

    pub(crate) fn temperatures(&self) -> Vec<f32> {
        self.temperatures.lock().clone()
    }

    fn persona_for(system_prompt: &str) -> Persona {
        Persona::ALL
            .into_iter()
            .find(|p| p.default_instructions() == system_prompt)
            .unwrap_or(Persona::Judge)
    }
}

#[async_trait]
impl LlmProvider for RoleEcho {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let persona = Self::persona_for(&messages[0].content);
        self.user_prompts.lock().push(messages[1].content.clone());
        self.temperatures.lock().push(config.temperature);

        let content = {
            let mut scripts = self.scripts.lock();
            match scripts.get_mut(&persona) {
                None => format!("{} says", persona.display_name()),
                Some(Script::Fixed(text)) => text.clone(),
                Some(Script::Sequence(texts)) if texts.len() > 1 => texts.pop().unwrap_or_default(),
                Some(Script::Sequence(texts)) => texts.last().cloned().unwrap_or_default(),
                Some(Script::Fail) => {
                    return Err(ProviderError::HttpError("connection refused".to_string()))
                }
            }
        };

        Ok(CompletionResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            },
            model: config.model.clone(),
            finish_reason: Some("stop".to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "role-echo"
    }
}

/// Runner over `script` with retries disabled.
pub(crate) fn runner(script: RoleEcho) -> (PersonaRunner, Arc<RoleEcho>) {
    let provider = Arc::new(script);
    let mut config = RuntimeConfig::default();
    config.retry.max_retries = 0;
    config.retry.min_delay = Duration::from_millis(1);
    config.retry.max_delay = Duration::from_millis(1);

    let gateway = Gateway::new(provider.clone(), Duration::from_secs(1));
    let runner = PersonaRunner::new(gateway, Arc::new(PersonaTable::new()), &config);
    (runner, provider)
}
