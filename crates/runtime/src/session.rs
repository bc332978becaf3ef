//! Session management and the tool-calling loop.

use std::fmt;

use tracing::{debug, info, warn};

use crate::conversation::Conversation;
use crate::llm::{AssistantMessage, Backend, ChatRequest, Message, ToolCall};
use crate::normalize::result_to_text;
use crate::schema::FunctionTool;
use crate::tools::{ToolArguments, ToolHost};
use crate::Result;

/// Model round trips allowed per user turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Shown when the model answers with neither text nor tool calls.
pub const NO_CONTENT: &str = "(no content)";

/// Shown when a turn hits the iteration cap.
pub const LOOP_LIMIT_NOTICE: &str = "Tool loop limit reached; aborting this turn.";

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cap on model round trips per user turn.
    pub max_iterations: usize,
    /// Optional system prompt placed first in the conversation.
    pub system_prompt: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt: None,
        }
    }
}

impl SessionConfig {
    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// A line of user input, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput<'a> {
    /// `exit` or `quit`, any case.
    Exit,
    /// Nothing but whitespace.
    Blank,
    /// Text to send, trimmed.
    Message(&'a str),
}

impl<'a> UserInput<'a> {
    pub fn parse(line: &'a str) -> Self {
        let text = line.trim();
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            Self::Exit
        } else if text.is_empty() {
            Self::Blank
        } else {
            Self::Message(text)
        }
    }
}

/// How a user turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered without requesting tools.
    Reply(String),
    /// The model answered without requesting tools, but with no text.
    Empty,
    /// The iteration cap was hit while the model kept requesting tools.
    LoopLimit,
}

impl fmt::Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply(text) => f.write_str(text),
            Self::Empty => f.write_str(NO_CONTENT),
            Self::LoopLimit => f.write_str(LOOP_LIMIT_NOTICE),
        }
    }
}

/// Result of one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub outcome: TurnOutcome,
    /// Model round trips made.
    pub iterations: usize,
    /// Tool invocations made.
    pub tool_calls: usize,
}

/// A conversation session.
///
/// Owns the conversation and the tool set discovered at startup. One turn
/// runs to completion before the next can start.
pub struct Session<B, H> {
    backend: B,
    host: H,
    tools: Vec<FunctionTool>,
    conversation: Conversation,
    max_iterations: usize,
}

impl<B: Backend, H: ToolHost> Session<B, H> {
    /// Create a session, translating the host's tools once.
    pub fn new(backend: B, host: H, config: SessionConfig) -> Self {
        let tools = host.specs().iter().map(FunctionTool::from).collect();
        let conversation = match config.system_prompt {
            Some(prompt) => Conversation::with_system(prompt),
            None => Conversation::new(),
        };

        Self {
            backend,
            host,
            tools,
            conversation,
            max_iterations: config.max_iterations,
        }
    }

    /// Names of the tools offered to the model.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.function.name.as_str()).collect()
    }

    /// The conversation so far.
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Give back the tool host, ending the session.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Run one user turn.
    ///
    /// Calls the model until it answers without tool calls or the iteration
    /// cap is reached. Tool calls in one response run sequentially in the
    /// order requested. Any model or tool failure aborts the turn; whatever
    /// was appended before the failure stays in the conversation.
    pub async fn chat(&mut self, input: &str) -> Result<Turn> {
        self.conversation.push(Message::user(input));
        let mut tool_calls = 0;

        for iteration in 1..=self.max_iterations {
            info!(iteration, "tool loop iteration");

            let response = self
                .backend
                .chat(ChatRequest {
                    messages: self.conversation.messages(),
                    tools: &self.tools,
                })
                .await?;

            let AssistantMessage {
                role,
                content,
                tool_calls: calls,
            } = response.message;
            info!(
                ?role,
                content_length = content.len(),
                tool_calls = calls.len(),
                "model response"
            );

            // Interim text is kept even when tool calls follow.
            if !content.is_empty() {
                self.conversation.push(Message::new(role, content.clone()));
            }

            if calls.is_empty() {
                info!(iteration, "turn complete");
                let outcome = if content.is_empty() {
                    TurnOutcome::Empty
                } else {
                    TurnOutcome::Reply(content)
                };
                return Ok(Turn {
                    outcome,
                    iterations: iteration,
                    tool_calls,
                });
            }

            tool_calls += calls.len();
            self.run_tool_calls(calls).await?;
        }

        warn!(max_iterations = self.max_iterations, "tool loop limit reached");
        Ok(Turn {
            outcome: TurnOutcome::LoopLimit,
            iterations: self.max_iterations,
            tool_calls,
        })
    }

    async fn run_tool_calls(&mut self, calls: Vec<ToolCall>) -> Result<()> {
        info!(count = calls.len(), "executing tool calls");

        for (index, call) in calls.into_iter().enumerate() {
            info!(index = index + 1, tool = %call.name, arguments = %call.arguments, "tool call");
            let arguments = ToolArguments::from(call.arguments);

            let output = self.host.invoke(&call.name, arguments).await?;
            let text = result_to_text(Some(&output));
            debug!(tool = %call.name, result_length = text.len(), "tool result");

            self.conversation
                .push(Message::tool(call.id, call.name, text));
        }

        Ok(())
    }
}
