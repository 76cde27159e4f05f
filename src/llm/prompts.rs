//! Prompt templates for document question answering

use std::collections::HashMap;

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in `{{name}}` placeholders; unknown names are left as written.
    ///
    /// Single left-to-right pass over the template: substituted values are
    /// copied verbatim and never scanned for placeholders themselves.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            result.push_str(&rest[..start]);
            match values.get(after[..end].trim()) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }

        result.push_str(rest);
        result
    }

    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = after[..end].trim();
        if !name.is_empty() && !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
        rest = &after[end + 2..];
    }

    variables
}

/// Standard prompts used by the question-answering pipeline
pub struct RagPrompts;

impl RagPrompts {
    /// System instructions sent first in every chat request
    #[must_use]
    pub fn system() -> &'static str {
        "You answer questions about the user's uploaded documents. Use only the \
         numbered excerpts provided with the question. Cite excerpts as [n]. If the \
         excerpts do not contain the answer, say that you could not find it in the \
         documents instead of guessing."
    }

    /// Final user turn carrying the retrieved context
    #[must_use]
    pub fn context_qa() -> PromptTemplate {
        PromptTemplate::new(
            r"Document excerpts:

{{context}}

Question: {{question}}",
        )
    }

    /// Fixed answer when nothing was retrieved
    #[must_use]
    pub fn no_context_answer() -> &'static str {
        "I could not find any relevant information in the uploaded documents."
    }
}
