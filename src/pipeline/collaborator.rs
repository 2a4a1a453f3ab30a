//! Text-to-text collaborators backed by an LLM.
//!
//! Both the structure extractor and the summarizer take PL/SQL source and
//! return Markdown. They differ only in the prompt they send.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{ChatMessage, ChatOptions, LlmClient};

/// A remote text-to-text step applied to one source file.
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Transform PL/SQL source into Markdown.
    async fn run(&self, code: &str) -> anyhow::Result<String>;
}

/// Shared handle to a collaborator.
pub type CollaboratorRef = Arc<dyn Collaborator>;

/// System and user prompt pair; `{code}` in the user template is replaced by the source.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub system: &'static str,
    pub user: &'static str,
}

impl PromptTemplate {
    pub fn render(&self, code: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system),
            ChatMessage::user(self.user.replace("{code}", code)),
        ]
    }
}

pub const STRUCTURE_PROMPT: PromptTemplate = PromptTemplate {
    system: "You analyze PL/SQL code. List every major component in the code you are given: \
packages, procedures, functions and triggers, and note the dependencies between them. \
Answer in clear Markdown.",
    user: "Extract the structure of this PL/SQL code:

```sql
{code}
```

List:
- Packages
- Procedures (standalone and packaged)
- Functions (standalone and packaged)
- Triggers
- Dependencies (for example, procedure X calls function Y)

Answer in structured Markdown.",
};

pub const SUMMARY_PROMPT: PromptTemplate = PromptTemplate {
    system: "You summarize complex code for a broad audience. Describe the overall purpose \
and business logic of the PL/SQL code you are given rather than its technical details.",
    user: "Write a concise summary of the purpose and logic of this PL/SQL code:

```sql
{code}
```

A non-technical stakeholder should be able to follow it.",
};

/// Collaborator that sends a fixed prompt to an LLM.
pub struct LlmCollaborator {
    name: &'static str,
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptTemplate,
    options: ChatOptions,
}

impl LlmCollaborator {
    pub fn new(
        name: &'static str,
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptTemplate,
    ) -> Self {
        Self {
            name,
            llm,
            model: model.into(),
            prompt,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

/// Collaborator that lists packages, procedures, functions, triggers and their dependencies.
pub fn structure_extractor(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> LlmCollaborator {
    LlmCollaborator::new("structure_extractor", llm, model, STRUCTURE_PROMPT)
}

/// Collaborator that writes a business-level summary of a source file.
pub fn summary_inferer(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> LlmCollaborator {
    LlmCollaborator::new("summary_inferer", llm, model, SUMMARY_PROMPT)
}

#[async_trait]
impl Collaborator for LlmCollaborator {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, code: &str) -> anyhow::Result<String> {
        let messages = self.prompt.render(code);
        let response = self
            .llm
            .chat_completion_with_options(&self.model, &messages, self.options.clone())
            .await?;

        response
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("{} received an empty response from {}", self.name, self.model)
            })
    }
}
