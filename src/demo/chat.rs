//! Chat completion demo steps.

use crate::api::{ChatCompletions, ChatCompletionsOptions, ChatMessage, Transcript};
use crate::client::{AsyncCompletionsApi, CompletionsApi, Publisher, Subscription};
use crate::demo::console::Console;
use crate::demo::render;
use crate::error::Result;
use std::io::{self, Write};
use tracing::{debug, warn};

pub const ERROR_CONTEXT: &str = "There was an error getting chat completions.";
pub const COMPLETED_LINE: &str = "Completed called getChatCompletions.";

/// The fixed conversation: system, user, assistant, user
pub fn transcript_messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are a helpful assistant. You will talk like a pirate."),
        ChatMessage::user("Can you help me?"),
        ChatMessage::assistant("Of course, me hearty! What can I do for ye?"),
        ChatMessage::user("What's the best way to train a parrot?"),
    ]
}

pub fn chat_options() -> ChatCompletionsOptions {
    ChatCompletionsOptions::new(transcript_messages())
}

fn trace_received(chat: &ChatCompletions) {
    debug!(
        id = %chat.id,
        created_at = ?chat.created_at(),
        choices = chat.choices.len(),
        "Chat completions received"
    );
}

/// Blocking, single response
pub fn run_chat_completion<C>(client: &C, deployment: &str, console: &Console) -> Result<Transcript>
where
    C: CompletionsApi + ?Sized,
{
    let chat = client.get_chat_completions(deployment, chat_options())?;
    trace_received(&chat);
    console.record(|w| render::write_chat_completions(w, &chat))?;

    let mut transcript = Transcript::new();
    transcript.record(&chat);
    Ok(transcript)
}

/// Blocking, fragments printed as they arrive
pub fn run_chat_completion_streaming<C>(
    client: &C,
    deployment: &str,
    console: &Console,
) -> Result<Transcript>
where
    C: CompletionsApi + ?Sized,
{
    let mut transcript = Transcript::new();

    for fragment in client.get_chat_completions_stream(deployment, chat_options().with_stream(true))? {
        let fragment = fragment?;
        console.record(|w| render::write_chat_fragment(w, &fragment))?;
        transcript.record(&fragment);
    }

    debug!(fragments = transcript.fragments(), "Chat stream finished");
    Ok(transcript)
}

/// Non-blocking, single response
pub fn run_chat_completion_async<A>(client: &A, deployment: &str, console: &Console) -> Subscription
where
    A: AsyncCompletionsApi + ?Sized,
{
    subscribe(
        client.get_chat_completions(deployment, chat_options()),
        console,
        render::write_chat_completions,
    )
}

/// Non-blocking, streamed
pub fn run_chat_completion_streaming_async<A>(
    client: &A,
    deployment: &str,
    console: &Console,
) -> Subscription
where
    A: AsyncCompletionsApi + ?Sized,
{
    subscribe(
        client.get_chat_completions_stream(deployment, chat_options().with_stream(true)),
        console,
        render::write_chat_fragment,
    )
}

fn subscribe(
    publisher: Publisher<ChatCompletions>,
    console: &Console,
    write: fn(&mut dyn Write, &ChatCompletions) -> io::Result<()>,
) -> Subscription {
    let (on_next, on_error, on_complete) = (console.clone(), console.clone(), console.clone());

    publisher.subscribe(
        move |chat| {
            trace_received(&chat);
            if let Err(e) = on_next.record(|w| write(w, &chat)) {
                warn!(error = %e, "Failed to print chat completions");
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
