//! Text completion demo steps.

use crate::api::{Completions, CompletionsOptions, Transcript};
use crate::client::{AsyncCompletionsApi, CompletionsApi, Subscription};
use crate::demo::console::Console;
use crate::demo::render;
use crate::error::Result;
use tracing::{debug, warn};

pub const PROMPT: &str = "Why did the eagles not carry Frodo Baggins to Mordor?";

/// Token cap for the streaming requests
pub const STREAM_MAX_TOKENS: u32 = 1000;

pub const ERROR_CONTEXT: &str = "There was an error getting completions.";
pub const COMPLETED_LINE: &str = "Completed called getCompletions.";

pub fn prompt_options() -> CompletionsOptions {
    CompletionsOptions::new(vec![PROMPT.to_string()])
}

fn streaming_options() -> CompletionsOptions {
    prompt_options()
        .with_max_tokens(STREAM_MAX_TOKENS)
        .with_stream(true)
}

fn trace_received(completions: &Completions) {
    debug!(
        id = %completions.id,
        created_at = ?completions.created_at(),
        choices = completions.choices.len(),
        "Completions received"
    );
}

/// Blocking, single response
pub fn run_text_completion<C>(client: &C, deployment: &str, console: &Console) -> Result<Transcript>
where
    C: CompletionsApi + ?Sized,
{
    let completions = client.get_completions(deployment, prompt_options())?;
    trace_received(&completions);
    console.record(|w| render::write_completions(w, &completions))?;

    let mut transcript = Transcript::new();
    transcript.record(&completions);
    Ok(transcript)
}

/// Blocking, fragments printed as they arrive
pub fn run_text_completion_streaming<C>(
    client: &C,
    deployment: &str,
    console: &Console,
) -> Result<Transcript>
where
    C: CompletionsApi + ?Sized,
{
    let mut transcript = Transcript::new();

    for fragment in client.get_completions_stream(deployment, streaming_options())? {
        let fragment = fragment?;
        console.record(|w| render::write_completions(w, &fragment))?;
        transcript.record(&fragment);
    }

    debug!(fragments = transcript.fragments(), "Completions stream finished");
    Ok(transcript)
}

/// Non-blocking, single response. Returns as soon as the callbacks are registered.
pub fn run_text_completion_async<A>(client: &A, deployment: &str, console: &Console) -> Subscription
where
    A: AsyncCompletionsApi + ?Sized,
{
    subscribe(client.get_completions(deployment, prompt_options()), console)
}

/// Non-blocking, streamed
pub fn run_text_completion_streaming_async<A>(
    client: &A,
    deployment: &str,
    console: &Console,
) -> Subscription
where
    A: AsyncCompletionsApi + ?Sized,
{
    subscribe(client.get_completions_stream(deployment, streaming_options()), console)
}

fn subscribe(publisher: crate::client::Publisher<Completions>, console: &Console) -> Subscription {
    let (on_next, on_error, on_complete) = (console.clone(), console.clone(), console.clone());

    publisher.subscribe(
        move |completions| {
            trace_received(&completions);
            if let Err(e) = on_next.record(|w| render::write_completions(w, &completions)) {
                warn!(error = %e, "Failed to print completions");
            }
        },
        move |e| on_error.report_error(ERROR_CONTEXT, &e),
        move || {
            if let Err(e) = on_complete.line(COMPLETED_LINE) {
                warn!(error = %e, "Failed to print completion notice");
            }
        },
    )
}
