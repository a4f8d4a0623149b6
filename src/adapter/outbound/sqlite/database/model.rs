//! Database model types for Diesel ORM.
//!
//! Timestamps are stored as RFC 3339 text with nanosecond precision so
//! that lexicographic order matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use super::schema::{conversations, messages, subjects, votes};
use crate::domain::{
    Conversation, ConversationId, Message, MessageId, QuestionStatus, Subject, SubjectId,
    SubjectKind, Username, Vote, VoteId, VoteRecord,
};
use crate::error::{Error, Result};

pub(crate) fn format_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("invalid timestamp '{raw}': {e}")))
}

fn parse_name(raw: String, field: &'static str) -> Result<Username> {
    Username::parse(raw, field).map_err(|e| Error::Parse(e.to_string()))
}

/// Database row for a subject (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = subjects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SubjectRow {
    pub seq: i64,
    pub id: String,
    pub kind: String,
    pub question_id: Option<String>,
    pub author: String,
    pub title: Option<String>,
    pub body: String,
    pub created_at: String,
    pub vote_tally: i64,
    pub topic: Option<String>,
    pub status: Option<String>,
    pub approved: bool,
    pub approved_by: Option<String>,
    pub edited_at: Option<String>,
}

/// Database row for a subject (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = subjects)]
pub struct NewSubjectRow {
    pub id: String,
    pub kind: String,
    pub question_id: Option<String>,
    pub author: String,
    pub title: Option<String>,
    pub body: String,
    pub created_at: String,
    pub vote_tally: i64,
    pub topic: Option<String>,
    pub status: Option<String>,
    pub approved: bool,
    pub approved_by: Option<String>,
    pub edited_at: Option<String>,
}

/// Editable and moderation columns of a subject.
///
/// This is the only changeset ever applied to an existing subject row, so
/// an edit can never reach `vote_tally`.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = subjects)]
#[diesel(treat_none_as_null = true)]
pub struct SubjectDetailsRow {
    pub title: Option<String>,
    pub body: String,
    pub topic: Option<String>,
    pub status: Option<String>,
    pub approved: bool,
    pub approved_by: Option<String>,
    pub edited_at: Option<String>,
}

impl From<&Subject> for SubjectDetailsRow {
    fn from(subject: &Subject) -> Self {
        Self {
            title: subject.title.clone(),
            body: subject.body.clone(),
            topic: subject.topic.clone(),
            status: subject.status.map(|s| s.as_str().to_string()),
            approved: subject.approved,
            approved_by: subject.approved_by.as_ref().map(ToString::to_string),
            edited_at: subject.edited_at.as_ref().map(format_time),
        }
    }
}

impl From<&Subject> for NewSubjectRow {
    fn from(subject: &Subject) -> Self {
        let details = SubjectDetailsRow::from(subject);
        Self {
            id: subject.id.to_string(),
            kind: subject.kind.as_str().to_string(),
            question_id: subject.question.as_ref().map(ToString::to_string),
            author: subject.author.to_string(),
            title: details.title,
            body: details.body,
            created_at: format_time(&subject.created_at),
            vote_tally: subject.vote_tally,
            topic: details.topic,
            status: details.status,
            approved: details.approved,
            approved_by: details.approved_by,
            edited_at: details.edited_at,
        }
    }
}

impl TryFrom<SubjectRow> for Subject {
    type Error = Error;

    fn try_from(row: SubjectRow) -> Result<Self> {
        let kind: SubjectKind = row.kind.parse().map_err(Error::Parse)?;
        let status = row
            .status
            .map(|s| s.parse::<QuestionStatus>().map_err(Error::Parse))
            .transpose()?;
        Ok(Self {
            id: SubjectId::from(row.id),
            kind,
            question: row.question_id.map(SubjectId::from),
            author: parse_name(row.author, "author")?,
            title: row.title,
            body: row.body,
            topic: row.topic,
            status,
            approved: row.approved,
            approved_by: row
                .approved_by
                .map(|name| parse_name(name, "approved_by"))
                .transpose()?,
            created_at: parse_time(&row.created_at)?,
            edited_at: row.edited_at.as_deref().map(parse_time).transpose()?,
            vote_tally: row.vote_tally,
        })
    }
}

/// Database row for a vote record.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = votes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VoteRow {
    pub id: String,
    pub subject_id: String,
    pub voter: String,
    pub vote: i32,
    pub voted_at: String,
}

impl From<&VoteRecord> for VoteRow {
    fn from(record: &VoteRecord) -> Self {
        Self {
            id: record.id.to_string(),
            subject_id: record.subject.to_string(),
            voter: record.voter.to_string(),
            vote: vote_column(record.vote),
            voted_at: format_time(&record.voted_at),
        }
    }
}

impl TryFrom<VoteRow> for VoteRecord {
    type Error = Error;

    fn try_from(row: VoteRow) -> Result<Self> {
        let vote = Vote::from_value(i64::from(row.vote))
            .ok_or_else(|| Error::Parse(format!("invalid stored vote {}", row.vote)))?;
        Ok(Self {
            id: VoteId::from(row.id),
            subject: SubjectId::from(row.subject_id),
            voter: parse_name(row.voter, "voter")?,
            vote,
            voted_at: parse_time(&row.voted_at)?,
        })
    }
}

pub(crate) const fn vote_column(vote: Vote) -> i32 {
    match vote {
        Vote::Up => 1,
        Vote::Down => -1,
    }
}

/// Database row for a conversation.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ConversationRow {
    pub id: String,
    pub user_a: String,
    pub user_b: String,
    pub user_low: String,
    pub user_high: String,
    pub created_at: String,
}

impl From<&Conversation> for ConversationRow {
    fn from(conversation: &Conversation) -> Self {
        let pair = conversation.pair();
        Self {
            id: conversation.id.to_string(),
            user_a: conversation.user_a.to_string(),
            user_b: conversation.user_b.to_string(),
            user_low: pair.low().to_string(),
            user_high: pair.high().to_string(),
            created_at: format_time(&conversation.created_at),
        }
    }
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = Error;

    fn try_from(row: ConversationRow) -> Result<Self> {
        Ok(Self {
            id: ConversationId::from(row.id),
            user_a: parse_name(row.user_a, "user_a")?,
            user_b: parse_name(row.user_b, "user_b")?,
            created_at: parse_time(&row.created_at)?,
        })
    }
}

/// Database row for a message (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MessageRow {
    pub seq: i64,
    pub id: String,
    pub conversation_id: String,
    pub from_user: String,
    pub text: String,
    pub sent_at: String,
}

/// Database row for a message (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = messages)]
pub struct NewMessageRow {
    pub id: String,
    pub conversation_id: String,
    pub from_user: String,
    pub text: String,
    pub sent_at: String,
}

impl From<&Message> for NewMessageRow {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation.to_string(),
            from_user: message.from_user.to_string(),
            text: message.text.clone(),
            sent_at: format_time(&message.sent_at),
        }
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = Error;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Self {
            id: MessageId::from(row.id),
            conversation: ConversationId::from(row.conversation_id),
            from_user: parse_name(row.from_user, "from_user")?,
            text: row.text,
            sent_at: parse_time(&row.sent_at)?,
        })
    }
}
