//! Handlers for the `chat` command group.

use serde::Serialize;
use tabled::Tabled;

use crate::adapter::inbound::cli::command::{
    ChatCommand, ChatListArgs, ChatReplyArgs, ChatSendArgs, ConversationArg,
};
use crate::adapter::inbound::cli::output;
use crate::application::Delivered;
use crate::domain::{Conversation, ConversationId, Message};
use crate::error::Result;
use crate::infrastructure::Services;
use crate::port::inbound::SendMessage;

#[derive(Tabled)]
struct ConversationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Parties")]
    parties: String,
    #[tabled(rename = "Opened")]
    created_at: String,
}

impl From<&Conversation> for ConversationRow {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.to_string(),
            parties: format!("{} / {}", conversation.user_a, conversation.user_b),
            created_at: conversation.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Tabled)]
struct MessageRow {
    #[tabled(rename = "Sent at")]
    sent_at: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "Text")]
    text: String,
}

impl From<&Message> for MessageRow {
    fn from(message: &Message) -> Self {
        Self {
            sent_at: message.sent_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            from: message.from_user.to_string(),
            text: output::excerpt(&message.text, 60),
        }
    }
}

#[derive(Serialize)]
struct History {
    conversation: Conversation,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Removed {
    conversation: ConversationId,
    messages: usize,
}

/// Dispatch a `chat` subcommand.
pub async fn execute(services: &Services, command: &ChatCommand) -> Result<()> {
    match command {
        ChatCommand::Send(args) => execute_send(services, args).await,
        ChatCommand::Reply(args) => execute_reply(services, args).await,
        ChatCommand::History(args) => execute_history(services, args).await,
        ChatCommand::List(args) => execute_list(services, args).await,
        ChatCommand::Delete(args) => execute_delete(services, args).await,
    }
}

fn print_delivered(delivered: &Delivered) {
    output::success("Message sent");
    output::field("Conversation", output::highlight(&delivered.conversation.id));
    output::field("From", &delivered.message.from_user);
    output::field("Sent at", delivered.message.sent_at.to_rfc3339());
}

async fn execute_send(services: &Services, args: &ChatSendArgs) -> Result<()> {
    let delivered = services
        .messenger
        .send(SendMessage::direct(&args.from, &args.to, &args.text))
        .await?;
    output::record("message", &delivered, print_delivered);
    Ok(())
}

async fn execute_reply(services: &Services, args: &ChatReplyArgs) -> Result<()> {
    let conversation = ConversationId::from(args.conversation.as_str());
    let delivered = services
        .messenger
        .send(SendMessage::reply(conversation, &args.from, &args.text))
        .await?;
    output::record("message", &delivered, print_delivered);
    Ok(())
}

async fn execute_history(services: &Services, args: &ConversationArg) -> Result<()> {
    let id = ConversationId::from(args.conversation.as_str());
    let conversation = services.messenger.resolver().get(&id).await?;
    let messages = services.messenger.history(&id).await?;
    let history = History {
        conversation,
        messages,
    };

    output::record("history", &history, |history| {
        output::section(&format!(
            "{} / {}",
            history.conversation.user_a, history.conversation.user_b
        ));
        if history.messages.is_empty() {
            output::note("(no messages)");
        } else {
            output::table(history.messages.iter().map(MessageRow::from));
        }
    });
    Ok(())
}

async fn execute_list(services: &Services, args: &ChatListArgs) -> Result<()> {
    let conversations = services
        .messenger
        .resolver()
        .conversations_for(&args.user)
        .await?;
    output::record("conversations", &conversations, |conversations| {
        if conversations.is_empty() {
            output::note("(no conversations)");
        } else {
            output::table(conversations.iter().map(ConversationRow::from));
        }
    });
    Ok(())
}

async fn execute_delete(services: &Services, args: &ConversationArg) -> Result<()> {
    let id = ConversationId::from(args.conversation.as_str());
    let messages = services.messenger.resolver().delete(&id).await?;
    let removed = Removed {
        conversation: id,
        messages,
    };
    output::record("deleted", &removed, |removed| {
        output::success(&format!("Deleted conversation {}", removed.conversation));
        output::field("Messages", removed.messages);
    });
    Ok(())
}
