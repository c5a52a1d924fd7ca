/// Line-oriented terminal client: a ChatView over stdout and a small REPL
/// driving the engine.
use crate::client::ChatClient;
use crate::config::Config;
use crate::transport::UserSummary;
use crate::types::{DeliveryState, Message, PeerProfile};
use crate::view::ChatView;
use colored::*;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct TerminalView;

fn status_mark(message: &Message) -> ColoredString {
    match message.state {
        DeliveryState::Pending => "…".dimmed(),
        DeliveryState::Failed => "✗".red().bold(),
        DeliveryState::Confirmed => {
            if message.is_read {
                "✓✓".green()
            } else {
                "✓".dimmed()
            }
        }
    }
}

fn print_message(message: &Message) {
    if message.sender_is_self {
        println!(
            "  {} {} {}",
            "me:".cyan(),
            message.content,
            status_mark(message)
        );
    } else {
        println!("  {} {}", "them:".magenta(), message.content);
    }
}

impl ChatView for TerminalView {
    fn message_appended(&self, message: &Message) {
        print_message(message);
    }

    fn message_confirmed(&self, _temp_id: &str, message: &Message) {
        println!(
            "  {} message delivered as #{}",
            "✓".green(),
            message.id.cyan()
        );
    }

    fn message_failed(&self, temp_id: &str) {
        println!(
            "  {} send failed, {} to try again",
            "✗".red().bold(),
            format!("/retry {}", temp_id).yellow()
        );
    }

    fn history_loaded(&self, peer: &PeerProfile, messages: &[Message]) {
        let name = if peer.display_name().is_empty() {
            peer.id.as_str()
        } else {
            peer.display_name()
        };
        println!("{}", format!("── {} ──", name).bright_cyan().bold());
        if messages.is_empty() {
            println!("  {}", "No messages yet. Start the conversation!".dimmed());
        }
        for message in messages {
            print_message(message);
        }
    }

    fn history_failed(&self, peer_id: &str, reason: &str) {
        eprintln!(
            "{} Could not load conversation with {}: {}",
            "✗".red().bold(),
            peer_id.cyan(),
            reason.red()
        );
    }

    fn conversation_highlighted(&self, peer_id: &str) {
        println!("{} {}", "»".bright_cyan(), peer_id.cyan());
    }

    fn typing_indicator(&self, _peer_id: &str, is_typing: bool) {
        if is_typing {
            println!("  {}", "typing…".dimmed().italic());
        }
    }

    fn search_results(&self, users: &[UserSummary]) {
        if users.is_empty() {
            return;
        }
        println!("{}", format!("Found {} users:", users.len()).bright_white());
        for user in users {
            println!(
                "  {} {} {}",
                user.id.cyan(),
                user.username.bright_white(),
                user.full_name.dimmed()
            );
        }
    }

    fn unread_badge(&self, count: u64) {
        println!(
            "{} {} unread",
            "●".bright_cyan(),
            count.to_string().bright_white().bold()
        );
    }
}

fn print_usage() {
    println!("{}", "tidemark client".bright_cyan().bold());
    println!();
    println!("{}", "Commands:".bright_white().bold());
    println!("  {} <peer_id>       Open a conversation", "/open".cyan());
    println!("  {} <query>       Search the peer directory", "/search".cyan());
    println!("  {} <temp_id>      Retry a failed send", "/retry".cyan());
    println!("  {}               Total unread badge", "/unread".cyan());
    println!("  {} <peer_id>     Delete a conversation", "/delete".cyan());
    println!("  {} <peer_id> Mark a conversation unread", "/mark-unread".cyan());
    println!("  {}                 Quit", "/quit".cyan());
    println!();
    println!("Anything else is sent to the open conversation.");
}

/// Read stdin lines and drive the engine until EOF or /quit.
pub async fn run(client: Arc<ChatClient>, config: &Config) -> anyhow::Result<()> {
    print_usage();

    if let Some(peer) = &config.initial_peer {
        if let Err(e) = client.open_conversation(peer).await {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ') {
            Some(("/open", peer)) => {
                let _ = client.open_conversation(peer.trim()).await;
            }
            Some(("/search", query)) => {
                client.search(query);
            }
            Some(("/retry", temp_id)) => {
                if let Err(e) = client.retry(temp_id.trim()).await {
                    eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
                }
            }
            Some(("/delete", peer)) => {
                match client.delete_conversation(peer.trim()).await {
                    Ok(()) => println!("{} conversation deleted", "✓".green()),
                    Err(e) => eprintln!("{} {}", "✗".red().bold(), e.to_string().red()),
                }
            }
            Some(("/mark-unread", peer)) => {
                match client.mark_unread(peer.trim()).await {
                    Ok(()) => println!("{} marked unread", "✓".green()),
                    Err(e) => eprintln!("{} {}", "✗".red().bold(), e.to_string().red()),
                }
            }
            _ => match line {
                "/quit" => break,
                "/unread" => {
                    if let Err(e) = client.unread_count().await {
                        eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
                    }
                }
                "/help" => print_usage(),
                _ if line.starts_with('/') => {
                    eprintln!("{} Unknown command: {}", "✗".red().bold(), line.red());
                    print_usage();
                }
                content => {
                    client.notify_input().await;
                    if let Err(e) = client.submit(content).await {
                        eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
                    }
                }
            },
        }
    }

    Ok(())
}
