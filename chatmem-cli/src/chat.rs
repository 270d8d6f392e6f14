//! Chat REPL and session inspection commands.

use anyhow::Result;
use chatmem_common::{Config, ErrorHandler};
use chatmem_memory::{ConversationScope, MessageMemoryHandler, SessionScope, SESSION_KEY_FIELD};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::backend;

/// Slash command typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Message(&'a str),
    Reply(&'a str),
    Clear,
    Quit,
    Empty,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "/clear" => Input::Clear,
        "/quit" | "/exit" => Input::Quit,
        _ => match line.strip_prefix("/reply ") {
            Some(reply) => Input::Reply(reply.trim()),
            None => Input::Message(line),
        },
    }
}

/// Read lines from stdin; print the contextual message built for each one.
pub async fn run(config: &Config, in_memory: bool, session: Option<String>) -> Result<()> {
    let handler = MessageMemoryHandler::new(backend::memory(config, in_memory).await?);
    let errors = ErrorHandler::new("chat");
    let mut scope = match session {
        Some(key) => SessionScope::with_session_key(key),
        None => SessionScope::new(),
    };

    let key = handler.memory().get_or_create_session_key(&mut scope);
    println!("Session: {key}");
    println!("Commands: /reply <text>, /clear, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Clear => match handler.clear_session(&mut scope).await {
                Ok(()) => println!("History cleared."),
                Err(e) => println!("{}", errors.handle(&e)),
            },
            Input::Reply(reply) => {
                if let Err(e) = handler.record_assistant_reply(&mut scope, reply).await {
                    println!("{}", errors.handle(&e));
                }
            }
            Input::Message(text) => {
                match handler.prepare_contextual_message(&mut scope, text).await {
                    Ok(message) => println!("{message}"),
                    Err(e) => {
                        handler.record_failure(&mut scope, &e).await;
                        println!("{}", errors.handle(&e));
                    }
                }
            }
        }
    }

    if let Some(key) = scope.get(SESSION_KEY_FIELD) {
        tracing::info!(session_key = %key, "Chat session ended");
    }
    Ok(())
}

pub async fn history(config: &Config, session_key: &str, raw: bool) -> Result<()> {
    let memory = backend::memory(config, false).await?;

    if raw {
        for record in memory.retrieve(session_key).await? {
            println!("{record}");
        }
    } else {
        print!("{}", memory.render_history(session_key).await?);
    }
    Ok(())
}

pub async fn clear(config: &Config, session_key: &str) -> Result<()> {
    let memory = backend::memory(config, false).await?;
    memory.delete(session_key).await?;
    println!("Cleared {session_key}");
    Ok(())
}
