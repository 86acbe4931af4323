//! `taskchat chat`: one-shot messages and the stdin REPL.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::chat::{ChatReply, ChatService};
use crate::cli::error::CliResult;
use crate::db::{Database, Id};

const PROMPT: &str = "> ";
const BANNER: &str = "taskchat - type 'help' for what I can do, 'exit' to quit.";

fn render_reply(reply: &ChatReply) -> String {
    format!("{}\n(conversation #{})", reply.response, reply.conversation_id)
}

fn is_exit(line: &str) -> bool {
    matches!(
        line.to_ascii_lowercase().as_str(),
        "exit" | "quit" | "bye" | ":q"
    )
}

/// Send a single message
pub async fn send<D: Database + 'static>(
    chat: &ChatService<D>,
    conversation: Option<Id>,
    message: &str,
) -> CliResult<String> {
    let reply = chat.send(conversation, message).await?;
    Ok(render_reply(&reply))
}

/// Read messages line by line until EOF or an exit word.
///
/// Every line after the first continues the same conversation. Returns the
/// conversation used, if any message was sent.
pub async fn repl<D, R, W>(
    chat: &ChatService<D>,
    mut conversation: Option<Id>,
    input: R,
    output: &mut W,
) -> CliResult<Option<Id>>
where
    D: Database + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(BANNER.as_bytes()).await?;
    output.write_all(b"\n").await?;

    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        let reply = chat.send(conversation, line).await?;
        conversation = Some(reply.conversation_id);
        output.write_all(reply.response.as_bytes()).await?;
        output.write_all(b"\n").await?;
    }

    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(conversation)
}
