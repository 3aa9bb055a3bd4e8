//! Demo Driver
//!
//! Runs the eight request variants (text and chat, blocking and
//! non-blocking, streaming and not) against a pair of clients and prints
//! each response.
//!
//! Steps are independent. A failing step is reported and the runner moves
//! on; non-blocking steps are joined with a bounded wait before the next
//! step begins.

pub mod chat;
pub mod console;
pub mod render;
pub mod text;


pub use chat::{
    run_chat_completion, run_chat_completion_async, run_chat_completion_streaming,
    run_chat_completion_streaming_async,
};
pub use console::{Console, SharedBuffer};
pub use text::{
    run_text_completion, run_text_completion_async, run_text_completion_streaming,
    run_text_completion_streaming_async,
};

use crate::api::Transcript;
use crate::client::{AsyncCompletionsApi, CompletionsApi, Subscription};
use crate::config::SampleConfig;
use crate::config::loader::{DEFAULT_ASYNC_WAIT, DEFAULT_CHAT_DEPLOYMENT, DEFAULT_COMPLETIONS_DEPLOYMENT};
use crate::error::Result;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One of the eight demo variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoStep {
    StreamingTextSync,
    StreamingTextAsync,
    StreamingChatSync,
    StreamingChatAsync,
    TextSync,
    TextAsync,
    ChatSync,
    ChatAsync,
}

impl DemoStep {
    /// Run order: the streaming group first, then the non-streaming group
    pub const ALL: [DemoStep; 8] = [
        DemoStep::StreamingTextSync,
        DemoStep::StreamingTextAsync,
        DemoStep::StreamingChatSync,
        DemoStep::StreamingChatAsync,
        DemoStep::TextSync,
        DemoStep::TextAsync,
        DemoStep::ChatSync,
        DemoStep::ChatAsync,
    ];

    /// Label used in the Beginning/End banners
    pub fn label(self) -> &'static str {
        match self {
            DemoStep::StreamingTextSync => "streaming text completions SYNC API",
            DemoStep::StreamingTextAsync => "streaming text completions ASYNC API",
            DemoStep::StreamingChatSync => "streaming chat completions SYNC API",
            DemoStep::StreamingChatAsync => "streaming chat completions ASYNC API",
            DemoStep::TextSync => "non-streaming text completions SYNC API",
            DemoStep::TextAsync => "non-streaming text completions ASYNC API",
            DemoStep::ChatSync => "non-streaming chat completions SYNC API",
            DemoStep::ChatAsync => "non-streaming chat completions ASYNC API",
        }
    }

    fn is_chat(self) -> bool {
        matches!(
            self,
            DemoStep::StreamingChatSync
                | DemoStep::StreamingChatAsync
                | DemoStep::ChatSync
                | DemoStep::ChatAsync
        )
    }
}

impl fmt::Display for DemoStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Failed,
    /// Non-blocking work was still running when the wait bound expired
    TimedOut,
}

/// Outcome of every step, in run order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<(DemoStep, StepOutcome)>,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| *outcome == StepOutcome::Completed)
    }

    pub fn outcome(&self, step: DemoStep) -> Option<StepOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, outcome)| *outcome)
    }
}

/// Deployments and timing for a run
#[derive(Debug, Clone)]
pub struct DemoSettings {
    pub completions_deployment: String,
    pub chat_deployment: String,
    pub async_wait: Duration,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            completions_deployment: DEFAULT_COMPLETIONS_DEPLOYMENT.to_string(),
            chat_deployment: DEFAULT_CHAT_DEPLOYMENT.to_string(),
            async_wait: DEFAULT_ASYNC_WAIT,
        }
    }
}

impl From<&SampleConfig> for DemoSettings {
    fn from(config: &SampleConfig) -> Self {
        Self {
            completions_deployment: config.completions_deployment.clone(),
            chat_deployment: config.chat_deployment.clone(),
            async_wait: config.async_wait,
        }
    }
}

/// Drives the demo steps against a blocking and a non-blocking client
pub struct DemoRunner<'a, C: ?Sized, A: ?Sized> {
    client: &'a C,
    async_client: &'a A,
    console: Console,
    settings: DemoSettings,
}

impl<'a, C, A> DemoRunner<'a, C, A>
where
    C: CompletionsApi + ?Sized,
    A: AsyncCompletionsApi + ?Sized,
{
    pub fn new(client: &'a C, async_client: &'a A, console: Console, settings: DemoSettings) -> Self {
        Self {
            client,
            async_client,
            console,
            settings,
        }
    }

    /// Run all eight steps in order
    pub fn run_all(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for step in DemoStep::ALL {
            let outcome = self.run_step(step);
            summary.outcomes.push((step, outcome));
        }

        let failed = summary
            .outcomes
            .iter()
            .filter(|(_, o)| *o != StepOutcome::Completed)
            .count();
        info!(steps = summary.outcomes.len(), failed, "Demo finished");
        summary
    }

    /// Run one step between its banners
    pub fn run_step(&self, step: DemoStep) -> StepOutcome {
        debug!(%step, "Running step");
        self.banner("Beginning of", step);

        let errors_before = self.console.error_count();
        let outcome = match self.execute(step) {
            Execution::Blocking(Ok(transcript)) => {
                debug!(
                    %step,
                    fragments = transcript.fragments(),
                    characters = transcript.text(0).map(str::len).unwrap_or(0),
                    "Step finished"
                );
                StepOutcome::Completed
            }
            Execution::Blocking(Err(e)) => {
                let context = if step.is_chat() {
                    chat::ERROR_CONTEXT
                } else {
                    text::ERROR_CONTEXT
                };
                self.console.report_error(context, &e);
                StepOutcome::Failed
            }
            Execution::NonBlocking(subscription) => {
                if subscription.wait(self.settings.async_wait) {
                    StepOutcome::Completed
                } else {
                    StepOutcome::TimedOut
                }
            }
        };

        // Errors from non-blocking steps only show up through the console
        let outcome = if outcome == StepOutcome::Completed && self.console.error_count() > errors_before {
            StepOutcome::Failed
        } else {
            outcome
        };

        self.banner("End of", step);
        outcome
    }

    fn execute(&self, step: DemoStep) -> Execution {
        let text = self.settings.completions_deployment.as_str();
        let chat = self.settings.chat_deployment.as_str();
        let console = &self.console;

        match step {
            DemoStep::StreamingTextSync => {
                Execution::Blocking(run_text_completion_streaming(self.client, text, console))
            }
            DemoStep::StreamingTextAsync => Execution::NonBlocking(
                run_text_completion_streaming_async(self.async_client, text, console),
            ),
            DemoStep::StreamingChatSync => {
                Execution::Blocking(run_chat_completion_streaming(self.client, chat, console))
            }
            DemoStep::StreamingChatAsync => Execution::NonBlocking(
                run_chat_completion_streaming_async(self.async_client, chat, console),
            ),
            DemoStep::TextSync => Execution::Blocking(run_text_completion(self.client, text, console)),
            DemoStep::TextAsync => {
                Execution::NonBlocking(run_text_completion_async(self.async_client, text, console))
            }
            DemoStep::ChatSync => Execution::Blocking(run_chat_completion(self.client, chat, console)),
            DemoStep::ChatAsync => {
                Execution::NonBlocking(run_chat_completion_async(self.async_client, chat, console))
            }
        }
    }

    fn banner(&self, prefix: &str, step: DemoStep) {
        if let Err(e) = self.console.line(format_args!("{} {}", prefix, step)) {
            warn!(error = %e, "Failed to print banner");
        }
    }
}

enum Execution {
    Blocking(Result<Transcript>),
    NonBlocking(Subscription),
}
