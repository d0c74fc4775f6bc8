use std::collections::HashMap;

/// A template for AI prompts that supports variable substitution.
pub struct PromptTemplate {
    template: &'static str,
}

impl PromptTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Render the template by replacing `{{key}}` with the corresponding value.
    pub fn render(&self, vars: &HashMap<&str, &str>) -> String {
        let mut output = self.template.to_string();
        for (k, v) in vars {
            let placeholder = format!("{{{{{}}}}}", k);
            output = output.replace(&placeholder, v);
        }
        output
    }
}

pub static SUMMARIZE_README_PROMPT: PromptTemplate = PromptTemplate::new(
    r#"You summarize GitHub repositories for a portfolio page.
Read the project context below and reply with a single JSON object of the form:

{
  "summary": "...",
  "techStack": ["..."]
}

Reply with nothing except this JSON object.

Rules for the summary:
- Describe what the project does and who it is for.
- At most 50 words, plain text, no markdown, no emojis.
- Prefer the README over the repository description when they disagree.
- Never mention that you are summarizing a README.

Rules for techStack:
- 3 to 8 canonical technology names (e.g. "Next.js", not "nextjs").
- Include the primary language.
- Omit generic words like "code" or "software".

Project context:
- Name: {{name}}
- Existing description: {{description}}
- Primary language: {{language}}
- Topics: {{topics}}
- Detected technologies: {{detected}}
- Top-level files: {{files}}

README content:
{{readme}}
"#,
);

pub static EXTRACT_TECH_PROMPT: PromptTemplate = PromptTemplate::new(
    r#"You identify the technology stack of a software project from its name
and description alone. Reply with a single JSON object:

{
  "techStack": ["..."]
}

Reply with nothing except this JSON object. List 1 to 6 canonical technology
names; reply with an empty list when the inputs give no usable signal.

Project name: {{name}}
Project description: {{description}}
"#,
);

pub static ANSWER_QUESTION_PROMPT: PromptTemplate = PromptTemplate::new(
    r###"You are an AI assistant answering questions about a developer based on
their resume and GitHub portfolio.

Resume and portfolio context:
{{resume}}

Question: {{question}}

Format the answer as professional markdown: "##" headings for main sections,
**bold** for key terms, "-" bullets for lists, fenced code blocks for code.
Keep the tone professional yet conversational. Answer only from the context
above, and say so when the context does not cover the question.

Answer:
"###,
);
