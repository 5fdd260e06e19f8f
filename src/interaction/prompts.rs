//! Prompt assembly.
//!
//! Templates live in [`crate::base::prompts`]. Assembly resolves the ticket's
//! topic and fills the `{name}` placeholders in a single pass, so text coming
//! from the caller is never re-expanded.

use serde_json::Value;
use tracing::instrument;

use crate::{
    base::{
        error::{ToolError, ToolRes},
        prompts::{CODE_ANALYSIS, CODE_ANALYSIS_FILE_STEP, CODE_ANALYSIS_LIST_STEP, PromptTemplate},
    },
    service::topics::TopicResolver,
};

use super::registry::JsonObject;

/// Caller-supplied prompt arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptArguments {
    pub ticket_id: i64,
    pub problem_description: Option<String>,
    pub project_subfolder: Option<String>,
    pub specific_file: Option<String>,
}

impl PromptArguments {
    pub fn new(ticket_id: i64) -> Self {
        Self { ticket_id, ..Default::default() }
    }

    /// Decodes MCP prompt arguments, enforcing the template's required set.
    ///
    /// Values may be strings or numbers; `ticket_id` must parse as an integer.
    pub fn from_json(template: &PromptTemplate, args: Option<&JsonObject>) -> ToolRes<Self> {
        let lookup = |name: &str| -> Option<String> {
            match args?.get(name)? {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        };

        for spec in template.arguments.iter().filter(|spec| spec.required) {
            if lookup(spec.name).is_none() {
                return Err(ToolError::invalid(format!("Prompt `{}` requires the `{}` argument.", template.name, spec.name)));
            }
        }

        let ticket_id = lookup("ticket_id")
            .ok_or_else(|| ToolError::invalid("ticket_id is required."))?
            .trim()
            .parse::<i64>()
            .map_err(|err| ToolError::invalid(format!("ticket_id must be an integer: {err}")))?;

        Ok(Self {
            ticket_id,
            problem_description: lookup("problem_description"),
            project_subfolder: lookup("project_subfolder"),
            specific_file: lookup("specific_file"),
        })
    }
}

/// Builds prompt text for a ticket.
#[derive(Clone)]
pub struct PromptAssembler {
    topics: TopicResolver,
}

impl PromptAssembler {
    pub fn new(topics: TopicResolver) -> Self {
        Self { topics }
    }

    /// Renders `template` for the given arguments.
    ///
    /// A store failure while resolving the topic does not fail the prompt; the
    /// topic is described generically instead.
    #[instrument(skip(self, template), fields(prompt = template.name))]
    pub async fn assemble(&self, template: &PromptTemplate, args: &PromptArguments) -> String {
        let topic = self.topics.resolve_or_describe(args.ticket_id).await;

        render(template, args, &topic)
    }
}

/// Fills a template once the topic is known.
pub fn render(template: &PromptTemplate, args: &PromptArguments, topic: &str) -> String {
    let ticket_id = args.ticket_id.to_string();
    let problem_description = args.problem_description.as_deref().unwrap_or_default();
    let project_subfolder = args.project_subfolder.as_deref().unwrap_or_default();

    let first_step;
    let mut values = vec![
        ("topic", topic),
        ("ticket_id", ticket_id.as_str()),
        ("problem_description", problem_description),
        ("project_subfolder", project_subfolder),
    ];

    if template.name == CODE_ANALYSIS.name {
        first_step = match args.specific_file.as_deref() {
            Some(file) => fill(CODE_ANALYSIS_FILE_STEP, &[("specific_file", file), ("project_subfolder", project_subfolder)]),
            None => fill(CODE_ANALYSIS_LIST_STEP, &[("project_subfolder", project_subfolder)]),
        };
        values.push(("first_step", first_step.as_str()));
    }

    fill(template.body, &values).trim().to_string()
}

/// Replaces each `{name}` whose name is in `values`; anything else is copied through.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let replacement = after.find('}').and_then(|end| values.iter().find(|(key, _)| *key == &after[..end]).map(|(_, value)| (end, *value)));

        match replacement {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

// Tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        base::prompts::{ALL_PROMPTS, COMPREHENSIVE_DIAGNOSIS, DATA_INVESTIGATION, WIKI_DIAGNOSIS},
        service::db::{DbClient, MockDb},
    };

    fn assembler(mock: MockDb) -> PromptAssembler {
        PromptAssembler::new(TopicResolver::new(DbClient::new(Arc::new(mock))))
    }

    #[test]
    fn test_fill_is_single_pass() {
        let filled = fill("a {x} b {y} {unknown} {", &[("x", "{y}"), ("y", "Y")]);

        assert_eq!(filled, "a {y} b Y {unknown} {");
    }

    #[tokio::test]
    async fn test_wiki_prompt_embeds_topic_and_ticket() {
        let mut mock = MockDb::new();
        mock.expect_get_ticket_topic().withf(|id| *id == 7).returning(|_| Ok(Some("Cybersecurity".to_string())));

        let text = assembler(mock).assemble(&WIKI_DIAGNOSIS, &PromptArguments::new(7)).await;

        assert!(text.contains("'Cybersecurity'"));
        assert!(text.contains("ticket ID 7"));
        assert!(text.contains("topic=\"Cybersecurity\""));
        assert!(!text.contains('{'));
    }

    #[tokio::test]
    async fn test_store_failure_falls_back_to_generic_phrase() {
        let mut mock = MockDb::new();
        mock.expect_get_ticket_topic().returning(|_| Err(anyhow::anyhow!("store unavailable")));

        let text = assembler(mock).assemble(&COMPREHENSIVE_DIAGNOSIS, &PromptArguments::new(12)).await;

        assert!(text.contains("issue related to ticket 12"));
    }

    #[tokio::test]
    async fn test_missing_ticket_embeds_unknown_topic() {
        let mut mock = MockDb::new();
        mock.expect_get_ticket_topic().returning(|_| Ok(None));

        let text = assembler(mock).assemble(&WIKI_DIAGNOSIS, &PromptArguments::new(404)).await;

        assert!(text.contains("'Unknown Topic'"));
    }

    #[test]
    fn test_code_analysis_first_step_depends_on_specific_file() {
        let mut args = PromptArguments {
            ticket_id: 3,
            problem_description: Some("Bids are dropped".to_string()),
            project_subfolder: Some("Bidding".to_string()),
            specific_file: None,
        };

        let listing = render(&CODE_ANALYSIS, &args, "Web Development");
        args.specific_file = Some("Bidding/src/Auction.cs".to_string());
        let pointed = render(&CODE_ANALYSIS, &args, "Web Development");

        assert!(listing.contains("use `list_code_files` with `subfolder=\"Bidding\"`"));
        assert!(pointed.contains("points towards the file `Bidding/src/Auction.cs` in project subfolder `Bidding`"));
        assert!(pointed.contains("\"Bids are dropped\""));
    }

    #[test]
    fn test_caller_text_is_not_expanded() {
        let args = PromptArguments {
            ticket_id: 1,
            problem_description: Some("literal {topic} here".to_string()),
            ..Default::default()
        };

        let text = render(&DATA_INVESTIGATION, &args, "Data Analysis");

        assert!(text.contains("literal {topic} here"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let args = PromptArguments::new(5);

        for prompt in ALL_PROMPTS {
            assert_eq!(render(prompt, &args, "Natural Language Processing"), render(prompt, &args, "Natural Language Processing"));
        }
    }

    #[test]
    fn test_arguments_from_json() {
        let object = json!({ "ticket_id": "7", "problem_description": "No impressions" });
        let args = PromptArguments::from_json(&DATA_INVESTIGATION, object.as_object()).unwrap();

        assert_eq!(args.ticket_id, 7);
        assert_eq!(args.problem_description.as_deref(), Some("No impressions"));
    }

    #[test]
    fn test_arguments_accept_numeric_ticket_id() {
        let object = json!({ "ticket_id": 9 });

        assert_eq!(PromptArguments::from_json(&WIKI_DIAGNOSIS, object.as_object()).unwrap().ticket_id, 9);
    }

    #[test]
    fn test_arguments_reject_missing_or_bad_values() {
        let missing = json!({ "ticket_id": "7" });
        let not_a_number = json!({ "ticket_id": "seven" });

        assert!(matches!(PromptArguments::from_json(&DATA_INVESTIGATION, missing.as_object()), Err(ToolError::InvalidArguments(_))));
        assert!(matches!(PromptArguments::from_json(&WIKI_DIAGNOSIS, not_a_number.as_object()), Err(ToolError::InvalidArguments(_))));
        assert!(PromptArguments::from_json(&WIKI_DIAGNOSIS, None).is_err());
    }
}
