#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! [`SemanticOracle`] backed by an OpenAI-compatible chat completion API.

use anyhow::{Context, Result, anyhow};
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use futures::{FutureExt, future::BoxFuture};
use itertools::Itertools;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{ElaborationRequest, SemanticOracle};
use crate::{
    config::OpenAiEnv,
    constants::{
        ELABORATION_SUBMISSION_TRUNCATE, RELEVANCE_PROBLEM_TRUNCATE,
        RELEVANCE_SUBMISSION_TRUNCATE,
    },
    text::truncate_chars,
    types::{SubmissionKind, Verdict},
};

/// System message sent with every request.
const SYSTEM_MESSAGE: &str = "You assist an automated grading system. You never assign scores.";

/// Relevance prompt template.
const RELEVANCE_PROMPT: &str = include_str!("prompts/relevance.md");

/// Elaboration prompt template.
const ELABORATION_PROMPT: &str = include_str!("prompts/elaboration.md");

/// Temperature used for relevance verdicts when none is configured.
const RELEVANCE_TEMPERATURE: f32 = 0.0;

/// Temperature used for elaborations when none is configured.
const ELABORATION_TEMPERATURE: f32 = 0.6;

/// Matches a `{name}` placeholder in a prompt template.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid"));

/// Chat-completion oracle.
#[derive(Clone)]
pub struct OpenAiOracle {
    /// API client.
    client:      OpenAIClient<OpenAIConfig>,
    /// Model identifier.
    model:       String,
    /// Optional temperature override.
    temperature: Option<f32>,
}

impl std::fmt::Debug for OpenAiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiOracle")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl OpenAiOracle {
    /// Creates an oracle from environment credentials and a shared HTTP
    /// client.
    pub fn new(env: &OpenAiEnv, http_client: reqwest::Client) -> Self {
        let client = OpenAIClient::with_config(
            OpenAIConfig::new()
                .with_api_base(env.api_base())
                .with_api_key(env.api_key()),
        )
        .with_http_client(http_client);

        Self {
            client,
            model: env.model().to_string(),
            temperature: env.temperature(),
        }
    }

    /// Sends one system and one user message and returns the reply text.
    async fn complete(&self, prompt: String, default_temperature: f32) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_MESSAGE.to_string())
                .build()
                .context("Failed to build system message")?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .context("Failed to build user message")?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature.unwrap_or(default_temperature))
            .build()
            .context("Failed to build chat completion request")?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .context("Chat completion request failed")?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| anyhow!("Oracle returned an empty completion"))
    }
}

/// Substitutes every `{name}` placeholder of `template` in one pass.
///
/// Inserted values are never rescanned, so braces inside a problem statement
/// or submission stay literal. Unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

/// Fills the relevance prompt template.
pub fn relevance_prompt(
    problem_statement: &str,
    submission: &str,
    kind: SubmissionKind,
) -> String {
    fill_template(
        RELEVANCE_PROMPT,
        &[
            ("kind", kind.as_str()),
            ("problem", truncate_chars(problem_statement, RELEVANCE_PROBLEM_TRUNCATE)),
            ("submission", truncate_chars(submission, RELEVANCE_SUBMISSION_TRUNCATE)),
        ],
    )
}

/// Fills the elaboration prompt template.
pub fn elaboration_prompt(request: &ElaborationRequest) -> String {
    let findings = if request.findings.is_empty() {
        "None".to_string()
    } else {
        request.findings.iter().map(|f| format!("- {f}")).join("\n")
    };
    let missing = if request.missing_concepts.is_empty() {
        "None".to_string()
    } else {
        request.missing_concepts.join(", ")
    };
    let kind = request.kind.as_str().to_uppercase();

    fill_template(
        ELABORATION_PROMPT,
        &[
            ("kind", kind.as_str()),
            ("relevance", request.relevance.as_str()),
            (
                "problem",
                truncate_chars(&request.problem_statement, RELEVANCE_PROBLEM_TRUNCATE),
            ),
            ("rubric", request.rubric_context.as_str()),
            ("findings", findings.as_str()),
            ("missing", missing.as_str()),
            (
                "submission",
                truncate_chars(&request.submission, ELABORATION_SUBMISSION_TRUNCATE),
            ),
        ],
    )
}

/// Splits an elaboration reply into trimmed, non-empty lines.
pub fn elaboration_lines(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

impl SemanticOracle for OpenAiOracle {
    fn check_relevance<'a>(
        &'a self,
        problem_statement: &'a str,
        submission: &'a str,
        kind: SubmissionKind,
    ) -> BoxFuture<'a, Result<Verdict>> {
        async move {
            let prompt = relevance_prompt(problem_statement, submission, kind);
            let reply = self.complete(prompt, RELEVANCE_TEMPERATURE).await?;
            Verdict::parse_response(&reply)
                .ok_or_else(|| anyhow!("Could not find a verdict in oracle reply: {reply}"))
        }
        .boxed()
    }

    fn elaborate<'a>(
        &'a self,
        request: &'a ElaborationRequest,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        async move {
            let reply = self
                .complete(elaboration_prompt(request), ELABORATION_TEMPERATURE)
                .await?;
            Ok::<_, anyhow::Error>(elaboration_lines(&reply))
        }
        .boxed()
    }
}
