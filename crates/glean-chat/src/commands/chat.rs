//! Interactive chat REPL.
//!
//! Rendering consumes store subscription snapshots. A message is printed
//! once its delivery status settles (or immediately when it carries no
//! status), so streamed assistant content appears fully accumulated.

use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex};

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use glean_chat_core::chat::{
    ChatController, Message, MessageSource, MessageStatus, MessageStore, NewMessage, Role,
};

use crate::error::Error;

const HELP: &str = "/mock <text>  inject a mock assistant reply\n/clear        clear the conversation\n/quit         exit";

pub async fn run(store: Arc<MessageStore>, controller: ChatController) -> Result<(), Error> {
    let printed: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
    let seen = printed.clone();
    let subscription = store.subscribe(move |snapshot: &[Message]| {
        let mut seen = seen.lock().unwrap();
        for message in snapshot {
            if message.status == Some(MessageStatus::Sending) || seen.contains(&message.id) {
                continue;
            }
            render(message);
            seen.insert(message.id.clone());
        }
    });

    println!("{}", HELP.dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => {}
            "/quit" | "/exit" => break,
            "/clear" => store.clear(),
            _ if line.starts_with("/mock") => {
                let text = line.trim_start_matches("/mock").trim();
                if !text.is_empty() {
                    store.add(
                        NewMessage::new(Role::Assistant, text)
                            .with_status(MessageStatus::Sent)
                            .with_source(MessageSource::Other),
                    );
                }
            }
            _ => controller.send(line).await,
        }
    }

    subscription.unsubscribe();
    Ok(())
}

fn render(message: &Message) {
    let tag = match message.role {
        Role::User => "you".blue().bold(),
        Role::Assistant => "assistant".green().bold(),
        Role::System => "system".yellow().bold(),
    };
    let suffix = match message.status {
        Some(MessageStatus::Error) => format!(" {}", "[failed]".red()),
        _ => String::new(),
    };
    println!("{tag}: {}{suffix}", message.content);
}
