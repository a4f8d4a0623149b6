//! Command-line interface definitions.
//!
//! Defines the CLI structure for qa-ledger using `clap`: subject and vote
//! commands at the top level, chat and config as command groups.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::domain::{QuestionStatus, SubjectKind};

/// Question and answer vote ledger with two-party chat
#[derive(Parser, Debug)]
#[command(name = "qa-ledger")]
#[command(version, about)]
pub struct Cli {
    /// Configuration file [default: ~/.qa-ledger/config.toml if present]
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the qa-ledger CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Post a new question
    Ask(AskArgs),

    /// Answer an existing question
    Answer(AnswerArgs),

    /// Vote on a question or answer (1 up, -1 down, 0 retract)
    Vote(VoteArgs),

    /// Show a subject with its answers and votes
    Show(SubjectArg),

    /// List subjects, optionally filtered
    List(ListArgs),

    /// Edit the title, body or topic of a subject
    Edit(EditArgs),

    /// Open, close or deny a question
    Moderate(ModerateArgs),

    /// Approve an answer, or revoke its approval
    Approve(ApproveArgs),

    /// Delete a subject, its votes and (for questions) its answers
    Delete(SubjectArg),

    /// Check a subject's stored tally against its vote records
    Audit(SubjectArg),

    /// Two-party conversations
    #[command(subcommand)]
    Chat(ChatCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `qa-ledger ask`.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Username of the author
    #[arg(long)]
    pub author: String,

    /// Short title
    #[arg(long, default_value = "")]
    pub title: String,

    /// Question text
    #[arg(long)]
    pub body: String,

    /// Topic to file the question under
    #[arg(long)]
    pub topic: Option<String>,
}

/// Arguments for `qa-ledger answer`.
#[derive(Args, Debug)]
pub struct AnswerArgs {
    /// Question ID
    pub question: String,

    /// Username of the author
    #[arg(long)]
    pub author: String,

    /// Answer text
    #[arg(long)]
    pub body: String,
}

/// Arguments for `qa-ledger vote`.
#[derive(Args, Debug)]
pub struct VoteArgs {
    /// Question or answer ID
    pub subject: String,

    /// Username of the voter
    #[arg(long)]
    pub voter: String,

    /// 1 to vote up, -1 to vote down, 0 to retract
    #[arg(long, allow_negative_numbers = true)]
    pub value: i64,
}

/// A single subject ID.
#[derive(Args, Debug)]
pub struct SubjectArg {
    /// Question or answer ID
    pub subject: String,
}

/// Arguments for `qa-ledger list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list subjects of this kind
    #[arg(long)]
    pub kind: Option<KindArg>,

    /// Only list questions with this status
    #[arg(long)]
    pub status: Option<StatusArg>,

    /// Only list questions filed under this topic
    #[arg(long)]
    pub topic: Option<String>,

    /// Only list answers to this question
    #[arg(long, value_name = "QUESTION")]
    pub question: Option<String>,

    /// Only list approved answers
    #[arg(long, conflicts_with = "unapproved")]
    pub approved: bool,

    /// Only list answers awaiting approval
    #[arg(long)]
    pub unapproved: bool,
}

/// Arguments for `qa-ledger edit`.
#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("change")
        .required(true)
        .multiple(true)
        .args(["title", "body", "topic"])
))]
pub struct EditArgs {
    /// Question or answer ID
    pub subject: String,

    /// New title (questions only; empty clears it)
    #[arg(long)]
    pub title: Option<String>,

    /// New text
    #[arg(long)]
    pub body: Option<String>,

    /// New topic (questions only; empty clears it)
    #[arg(long)]
    pub topic: Option<String>,
}

/// Arguments for `qa-ledger moderate`.
#[derive(Args, Debug)]
pub struct ModerateArgs {
    /// Question ID
    pub question: String,

    /// New status
    #[arg(long)]
    pub status: StatusArg,

    /// Username of the moderator
    #[arg(long)]
    pub moderator: String,
}

/// Arguments for `qa-ledger approve`.
#[derive(Args, Debug)]
pub struct ApproveArgs {
    /// Answer ID
    pub answer: String,

    /// Username of the moderator
    #[arg(long)]
    pub moderator: String,

    /// Withdraw an earlier approval
    #[arg(long)]
    pub revoke: bool,
}

/// Subject kind filter.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Question,
    Answer,
}

impl From<KindArg> for SubjectKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Question => Self::Question,
            KindArg::Answer => Self::Answer,
        }
    }
}

/// Question status.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusArg {
    Open,
    Closed,
    Denied,
}

impl From<StatusArg> for QuestionStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Open => Self::Open,
            StatusArg::Closed => Self::Closed,
            StatusArg::Denied => Self::Denied,
        }
    }
}

/// Subcommands for `qa-ledger chat`.
#[derive(Subcommand, Debug)]
pub enum ChatCommand {
    /// Send a message, opening the conversation on first contact
    Send(ChatSendArgs),
    /// Reply in an existing conversation
    Reply(ChatReplyArgs),
    /// Show the messages of a conversation
    History(ConversationArg),
    /// List a user's conversations
    List(ChatListArgs),
    /// Delete a conversation and its messages
    Delete(ConversationArg),
}

/// Arguments for `qa-ledger chat send`.
#[derive(Args, Debug)]
pub struct ChatSendArgs {
    /// Sender username
    #[arg(long)]
    pub from: String,

    /// Recipient username
    #[arg(long)]
    pub to: String,

    /// Message text
    #[arg(long)]
    pub text: String,
}

/// Arguments for `qa-ledger chat reply`.
#[derive(Args, Debug)]
pub struct ChatReplyArgs {
    /// Conversation ID
    pub conversation: String,

    /// Sender username
    #[arg(long)]
    pub from: String,

    /// Message text
    #[arg(long)]
    pub text: String,
}

/// A single conversation ID.
#[derive(Args, Debug)]
pub struct ConversationArg {
    /// Conversation ID
    pub conversation: String,
}

/// Arguments for `qa-ledger chat list`.
#[derive(Args, Debug)]
pub struct ChatListArgs {
    /// Username whose conversations to list
    #[arg(long)]
    pub user: String,
}

/// Subcommands for `qa-ledger config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration for correctness.
    Validate,
}
