//! Human-readable rendering of responses and fragments.

use crate::api::{ChatCompletions, Completions, CompletionsUsage};
use std::io::{self, Write};

fn write_header(w: &mut dyn Write, id: &str, created: u64) -> io::Result<()> {
    writeln!(w, "Model ID={} is created at {}.", id, created)
}

/// Usage counters, verbatim
pub fn write_usage(w: &mut dyn Write, usage: &CompletionsUsage) -> io::Result<()> {
    writeln!(
        w,
        "Usage: number of prompt token is {}, number of completion token is {}, \
         and number of total tokens in request and response is {}.",
        usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
    )
}

/// A text completion or one streamed fragment of it
pub fn write_completions(w: &mut dyn Write, completions: &Completions) -> io::Result<()> {
    write_header(w, &completions.id, completions.created)?;
    for choice in &completions.choices {
        writeln!(w, "Index: {}, Text: {}.", choice.index, choice.text)?;
    }

    if let Some(usage) = &completions.usage {
        write_usage(w, usage)?;
    }
    Ok(())
}

fn write_chat_choices(w: &mut dyn Write, chat: &ChatCompletions) -> io::Result<()> {
    write_header(w, &chat.id, chat.created)?;
    for choice in &chat.choices {
        let role = choice.role().map(|r| r.to_string()).unwrap_or_default();
        writeln!(w, "Index: {}, Chat Role: {}.", choice.index, role)?;
        writeln!(w, "Message:")?;
        writeln!(w, "{}", choice.content().unwrap_or_default())?;
    }
    Ok(())
}

/// A full chat completion
pub fn write_chat_completions(w: &mut dyn Write, chat: &ChatCompletions) -> io::Result<()> {
    write_chat_choices(w, chat)?;
    writeln!(w)?;

    if let Some(usage) = &chat.usage {
        write_usage(w, usage)?;
    }
    Ok(())
}

/// One streamed chat fragment
pub fn write_chat_fragment(w: &mut dyn Write, fragment: &ChatCompletions) -> io::Result<()> {
    write_chat_choices(w, fragment)?;

    if let Some(usage) = &fragment.usage {
        write_usage(w, usage)?;
    }
    Ok(())
}
