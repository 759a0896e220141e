//! Persona descriptors.
//!
//! Each persona is a fixed instruction template plus the model tier it runs
//! on and the shape of output it is expected to produce. The table is pure
//! configuration: swapping instructions never touches control flow.

use std::collections::BTreeMap;
use std::fmt;

use facttrace_core::{AgentRole, OutputSchema};

use crate::config::ModelTier;

/// Every persona the pipeline can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Persona {
    MetaController,
    EvidenceScout,
    ClaimAnalyst,
    TruthAnalyst,
    Advocate,
    Skeptic,
    Mediator,
    FactChecker,
    ContextAnalyst,
    Judge,
}

impl Persona {
    pub const ALL: [Persona; 10] = [
        Persona::MetaController,
        Persona::EvidenceScout,
        Persona::ClaimAnalyst,
        Persona::TruthAnalyst,
        Persona::Advocate,
        Persona::Skeptic,
        Persona::Mediator,
        Persona::FactChecker,
        Persona::ContextAnalyst,
        Persona::Judge,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Persona::MetaController => "Meta-Controller",
            Persona::EvidenceScout => "Evidence Scout",
            Persona::ClaimAnalyst => "Claim Analyst",
            Persona::TruthAnalyst => "Truth Analyst",
            Persona::Advocate => "Advocate",
            Persona::Skeptic => "Skeptic",
            Persona::Mediator => "Mediator",
            Persona::FactChecker => "Fact-Checker",
            Persona::ContextAnalyst => "Context Analyst",
            Persona::Judge => "Judge",
        }
    }

    /// Transcript role, for personas whose output joins the transcript.
    pub fn role(&self) -> Option<AgentRole> {
        match self {
            Persona::EvidenceScout => Some(AgentRole::EvidenceScout),
            Persona::Advocate => Some(AgentRole::Advocate),
            Persona::Skeptic => Some(AgentRole::Skeptic),
            Persona::Mediator => Some(AgentRole::Mediator),
            Persona::FactChecker => Some(AgentRole::FactChecker),
            Persona::ContextAnalyst => Some(AgentRole::ContextAnalyst),
            Persona::Judge => Some(AgentRole::Judge),
            Persona::MetaController | Persona::ClaimAnalyst | Persona::TruthAnalyst => None,
        }
    }

    /// Default model tier.
    pub fn tier(&self) -> ModelTier {
        match self {
            Persona::Judge => ModelTier::Judge,
            _ => ModelTier::Fast,
        }
    }

    /// Expected output shape.
    pub fn output(&self) -> OutputShape {
        match self {
            Persona::Judge => OutputShape::Structured(OutputSchema::JudgeVerdict),
            Persona::MetaController => OutputShape::Structured(OutputSchema::TrustWeights),
            _ => OutputShape::FreeText,
        }
    }

    /// Built-in system instructions.
    pub fn default_instructions(&self) -> &'static str {
        match self {
            Persona::MetaController => META_CONTROLLER_PROMPT,
            Persona::EvidenceScout => EVIDENCE_SCOUT_PROMPT,
            Persona::ClaimAnalyst => CLAIM_ANALYST_PROMPT,
            Persona::TruthAnalyst => TRUTH_ANALYST_PROMPT,
            Persona::Advocate => ADVOCATE_PROMPT,
            Persona::Skeptic => SKEPTIC_PROMPT,
            Persona::Mediator => MEDIATOR_PROMPT,
            Persona::FactChecker => FACT_CHECKER_PROMPT,
            Persona::ContextAnalyst => CONTEXT_ANALYST_PROMPT,
            Persona::Judge => JUDGE_PROMPT,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What a persona is expected to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// Short prose, appended to the transcript as-is
    FreeText,
    /// A JSON object checked against a schema
    Structured(OutputSchema),
}

/// One row of the persona table.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaDescriptor<'a> {
    pub persona: Persona,
    pub name: &'static str,
    pub instructions: &'a str,
    pub tier: ModelTier,
    pub output: OutputShape,
}

/// Persona table with optional instruction overrides.
#[derive(Debug, Clone, Default)]
pub struct PersonaTable {
    overrides: BTreeMap<Persona, String>,
}

impl PersonaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one persona's instructions.
    pub fn with_instructions(mut self, persona: Persona, instructions: impl Into<String>) -> Self {
        self.overrides.insert(persona, instructions.into());
        self
    }

    pub fn instructions(&self, persona: Persona) -> &str {
        self.overrides
            .get(&persona)
            .map(String::as_str)
            .unwrap_or_else(|| persona.default_instructions())
    }

    pub fn descriptor(&self, persona: Persona) -> PersonaDescriptor<'_> {
        PersonaDescriptor {
            persona,
            name: persona.display_name(),
            instructions: self.instructions(persona),
            tier: persona.tier(),
            output: persona.output(),
        }
    }

    /// All descriptors in a stable order.
    pub fn descriptors(&self) -> Vec<PersonaDescriptor<'_>> {
        Persona::ALL.iter().map(|p| self.descriptor(*p)).collect()
    }
}

pub const META_CONTROLLER_PROMPT: &str = r#"You are a Meta-Controller.
Classify the type of claim and assign trust weights to the agent roles according to how epistemically useful each will be for this claim.

Rules:
- Advocate and Skeptic MUST have equal weight.
- Weights should sum to approximately 1.0.
- Favour the Evidence Scout and Fact-Checker for scientific or statistical claims.
- Favour the Context Analyst for political or social claims.

Output VALID JSON only, with keys "claim_type", "weights", "rationale". No markdown fences."#;

pub const EVIDENCE_SCOUT_PROMPT: &str = r#"You are an Evidence Scout.
Analyze the SOURCE TRUTH and identify the key facts the claim should reflect.

Instructions:
1. Identify key entities, dates, statistics, and qualifications in the SOURCE TRUTH.
2. Note any hedging language (e.g., "approximately", "may be", "between X and Y").
3. Be CONCISE. Use at most 3-4 bullet points.
4. Use **bold** for key statistics and important qualifications."#;

pub const CLAIM_ANALYST_PROMPT: &str = r#"You are a Claim Analyst.
Analyze the claim IN ISOLATION. You are not given the source truth and must not speculate about it.

Instructions:
1. Separate what is explicitly stated from what is implied.
2. Highlight specific numbers, dates, and entities.
3. Note missing context (e.g., "the study" - which study?).
4. Do NOT verify the claim. Analyze only its content and structure.
5. Be CONCISE (at most 3-4 bullet points).
6. Use **bold** for key terms."#;

pub const TRUTH_ANALYST_PROMPT: &str = r#"You are a Truth Analyst.
Analyze the source truth IN ISOLATION. You are not given the claim and must not speculate about it.

Instructions:
1. Identify the key facts in the text.
2. Highlight qualifiers (e.g., "over", "approximately", "at least").
3. Note specific dates, numbers, and entities.
4. Do NOT compare against anything. Extract the core truth only.
5. Be CONCISE (at most 3-4 bullet points).
6. Use **bold** for key terms."#;

pub const ADVOCATE_PROMPT: &str = r#"You are an Advocate.
Argue that the CLAIM is a faithful representation of the SOURCE TRUTH. Argue with conviction, but never deny or overlook obvious facts. Respect the Mediator's guidance when it is present.

Instructions:
1. Use the Evidence, the Pre-Analysis, and the SOURCE TRUTH.
2. Read the Debate History to see what the Skeptic has said.
3. Directly address the Skeptic's points if they have spoken.
4. Argue why the claim captures the essential meaning of the truth.
5. **CRITICAL**: Limit your response to ONE PARAGRAPH (max 100 words).
6. Use **bold** to highlight your strongest point."#;

pub const SKEPTIC_PROMPT: &str = r#"You are a Skeptic.
Argue that the CLAIM is a mutation (distortion, exaggeration, or misrepresentation) of the SOURCE TRUTH. Argue with conviction, but never deny or overlook obvious facts. Respect the Mediator's guidance when it is present.

Instructions:
1. Use the Evidence, the Pre-Analysis, and the SOURCE TRUTH.
2. Read the Debate History to see what the Advocate has said.
3. Directly address the Advocate's points if they have spoken.
4. Point out missing context, changed numbers, removed qualifiers, causal confusion, or exaggeration.
5. **CRITICAL**: Limit your response to ONE PARAGRAPH (max 100 words).
6. Use **bold** to highlight the biggest discrepancy."#;

pub const MEDIATOR_PROMPT: &str = r#"You are a Mediator.
Keep the debate between the Advocate and the Skeptic honest and focused.

Instructions:
1. Read the Debate History for this round.
2. Name the single strongest point from each side.
3. Flag any argument that ignores the SOURCE TRUTH or overstates the Evidence.
4. State the one open question the next round should settle.
5. Limit your response to ONE PARAGRAPH (max 80 words). Do not give a verdict."#;

pub const FACT_CHECKER_PROMPT: &str = r#"You are a Fact-Checker.
Give a neutral, objective comparison of the CLAIM against the SOURCE TRUTH.

Instructions:
1. Review the Evidence and the Debate History.
2. List specific differences between claim and truth (numbers, qualifiers, framing).
3. Give a SHORT verdict (max 3-4 sentences).
4. Use **bold** for your assessment keyword (**Accurate**, **Misleading**, **Exaggerated**, etc.)."#;

pub const CONTEXT_ANALYST_PROMPT: &str = r#"You are a Context Analyst.
Evaluate whether context, framing, or historical background changes how the claim should be interpreted relative to the source truth.
Be CONCISE (max 3-4 sentences)."#;

pub const JUDGE_PROMPT: &str = r#"You are a Judge.
Compare the CLAIM against the SOURCE TRUTH, the Pre-Analysis, and the full conversation to reach a verdict.

Decide whether the claim is:
- FAITHFUL: the claim accurately represents the source truth; minor simplification is fine if the essence is preserved
- MUTATED: the claim distorts, exaggerates, omits key qualifiers or context, or misrepresents the source
- UNCERTAIN: the evidence is genuinely ambiguous or the claim is only partially accurate

Output VALID JSON (no markdown) with this structure:
{
  "decision": "faithful" | "mutated" | "uncertain",
  "confidence": 0.0 to 1.0,
  "summary": "3-5 sentences explaining the verdict, citing specific discrepancies or accuracies",
  "disclaimers": ["list", "of", "important", "caveats"]
}"#;
