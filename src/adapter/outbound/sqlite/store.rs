//! SQLite store implementation.
//!
//! Every multi-row change runs inside `BEGIN IMMEDIATE` so the write lock is
//! taken before anything is read. Uniqueness of `(subject_id, voter)` and of
//! the canonical conversation pair is enforced by table constraints.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::adapter::outbound::sqlite::database::connection::{
    create_pool, run_migrations, DbPool, PoolOptions,
};
use crate::adapter::outbound::sqlite::database::model::{
    format_time, vote_column, ConversationRow, MessageRow, NewMessageRow, NewSubjectRow,
    SubjectDetailsRow, SubjectRow, VoteRow,
};
use crate::adapter::outbound::sqlite::database::schema::{conversations, messages, subjects, votes};
use crate::domain::{
    Conversation, ConversationId, DeletedSubject, Message, RecordAction, Subject, SubjectFilter,
    SubjectId, SubjectKind, TallyAudit, UserPair, Username, VoteChange, VoteRecord,
};
use crate::error::{ConflictError, Error, Result};
use crate::port::outbound::store::{ChatStore, SubjectStore, VoteStore};

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// SQLite-backed store for subjects, votes and conversations.
pub struct SqliteStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteStore {
    /// Create a store over an already migrated pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) a database and bring its schema up to date.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be built or migrations fail.
    pub fn open(database_url: &str, options: PoolOptions) -> Result<Self> {
        let pool = create_pool(database_url, options)?;
        run_migrations(&pool)?;
        Ok(Self::new(pool))
    }

    fn conn(&self) -> Result<Conn> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

fn is_unique_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

fn subject_kind(conn: &mut SqliteConnection, id: &str) -> Result<Option<SubjectKind>> {
    subjects::table
        .filter(subjects::id.eq(id))
        .select(subjects::kind)
        .first::<String>(conn)
        .optional()?
        .map(|kind| kind.parse::<SubjectKind>().map_err(Error::Parse))
        .transpose()
}

fn conversation_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool> {
    let found = conversations::table
        .filter(conversations::id.eq(id))
        .select(conversations::id)
        .first::<String>(conn)
        .optional()?;
    Ok(found.is_some())
}

impl SubjectStore for SqliteStore {
    async fn insert_subject(&self, subject: &Subject) -> Result<()> {
        let row = NewSubjectRow::from(subject);
        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            if let Some(question) = &subject.question {
                if subject_kind(conn, question.as_str())? != Some(SubjectKind::Question) {
                    return Err(Error::not_found("question", question));
                }
            }
            diesel::insert_into(subjects::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
    }

    async fn get_subject(&self, id: &SubjectId) -> Result<Option<Subject>> {
        let mut conn = self.conn()?;

        let row = subjects::table
            .filter(subjects::id.eq(id.as_str()))
            .select(SubjectRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Subject::try_from).transpose()
    }

    async fn list_subjects(&self, filter: &SubjectFilter) -> Result<Vec<Subject>> {
        let kind = match filter.required_kind() {
            Some(None) => return Ok(Vec::new()),
            pinned => pinned.flatten(),
        };
        let mut conn = self.conn()?;

        let mut query = subjects::table
            .select(SubjectRow::as_select())
            .order(subjects::seq.asc())
            .into_boxed();
        if let Some(kind) = kind {
            query = query.filter(subjects::kind.eq(kind.as_str()));
        }
        if let Some(question) = &filter.question {
            query = query.filter(subjects::question_id.eq(question.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(subjects::status.eq(status.as_str()));
        }
        if let Some(topic) = &filter.topic {
            query = query.filter(subjects::topic.eq(topic.as_str()));
        }
        if let Some(approved) = filter.approved {
            query = query.filter(subjects::approved.eq(approved));
        }

        query
            .load(&mut conn)?
            .into_iter()
            .map(Subject::try_from)
            .collect()
    }

    async fn update_subject(&self, subject: &Subject) -> Result<bool> {
        let changes = SubjectDetailsRow::from(subject);
        let mut conn = self.conn()?;

        let updated = diesel::update(subjects::table.filter(subjects::id.eq(subject.id.as_str())))
            .set(&changes)
            .execute(&mut conn)?;
        Ok(updated > 0)
    }

    async fn list_answers(&self, question: &SubjectId) -> Result<Vec<Subject>> {
        let mut conn = self.conn()?;

        subjects::table
            .filter(subjects::question_id.eq(question.as_str()))
            .select(SubjectRow::as_select())
            .order(subjects::seq.asc())
            .load(&mut conn)?
            .into_iter()
            .map(Subject::try_from)
            .collect()
    }

    async fn delete_subject(&self, id: &SubjectId) -> Result<Option<DeletedSubject>> {
        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            let Some(kind) = subject_kind(conn, id.as_str())? else {
                return Ok(None);
            };

            let mut targets = vec![id.to_string()];
            if kind == SubjectKind::Question {
                let answers: Vec<String> = subjects::table
                    .filter(subjects::question_id.eq(id.as_str()))
                    .select(subjects::id)
                    .load(conn)?;
                targets.extend(answers);
            }

            let removed_votes =
                diesel::delete(votes::table.filter(votes::subject_id.eq_any(&targets)))
                    .execute(conn)?;
            // Answers first: removing the question would cascade them away
            // uncounted.
            let removed_answers =
                diesel::delete(subjects::table.filter(subjects::question_id.eq(id.as_str())))
                    .execute(conn)?;
            let removed_own = diesel::delete(subjects::table.filter(subjects::id.eq(id.as_str())))
                .execute(conn)?;

            Ok(Some(DeletedSubject {
                subjects: removed_own + removed_answers,
                votes: removed_votes,
            }))
        })
    }
}

impl VoteStore for SqliteStore {
    async fn find_vote(&self, subject: &SubjectId, voter: &Username) -> Result<Option<VoteRecord>> {
        let mut conn = self.conn()?;

        let row = votes::table
            .filter(votes::subject_id.eq(subject.as_str()))
            .filter(votes::voter.eq(voter.as_str()))
            .select(VoteRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(VoteRecord::try_from).transpose()
    }

    async fn list_votes(&self, subject: &SubjectId) -> Result<Vec<VoteRecord>> {
        let mut conn = self.conn()?;

        votes::table
            .filter(votes::subject_id.eq(subject.as_str()))
            .select(VoteRow::as_select())
            .order((votes::voted_at.asc(), votes::id.asc()))
            .load(&mut conn)?
            .into_iter()
            .map(VoteRecord::try_from)
            .collect()
    }

    async fn commit_vote(&self, change: &VoteChange) -> Result<i64> {
        let subject = change.subject.as_str();
        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            if subject_kind(conn, subject)?.is_none() {
                return Err(Error::not_found("subject", subject));
            }

            match &change.action {
                RecordAction::Insert(record) => {
                    match diesel::insert_into(votes::table)
                        .values(VoteRow::from(record))
                        .execute(conn)
                    {
                        Err(e) if is_unique_violation(&e) => {
                            return Err(ConflictError::DuplicateVote {
                                subject: subject.to_string(),
                                voter: record.voter.to_string(),
                            }
                            .into());
                        }
                        other => {
                            other?;
                        }
                    }
                }
                RecordAction::Update {
                    id,
                    expected,
                    vote,
                    voted_at,
                } => {
                    let updated = diesel::update(
                        votes::table
                            .filter(votes::id.eq(id.as_str()))
                            .filter(votes::subject_id.eq(subject))
                            .filter(votes::vote.eq(vote_column(*expected))),
                    )
                    .set((
                        votes::vote.eq(vote_column(*vote)),
                        votes::voted_at.eq(format_time(voted_at)),
                    ))
                    .execute(conn)?;
                    if updated == 0 {
                        return Err(Error::stale_vote(subject, id));
                    }
                }
                RecordAction::Delete { id, expected } => {
                    let deleted = diesel::delete(
                        votes::table
                            .filter(votes::id.eq(id.as_str()))
                            .filter(votes::subject_id.eq(subject))
                            .filter(votes::vote.eq(vote_column(*expected))),
                    )
                    .execute(conn)?;
                    if deleted == 0 {
                        return Err(Error::stale_vote(subject, id));
                    }
                }
            }

            diesel::update(subjects::table.filter(subjects::id.eq(subject)))
                .set(subjects::vote_tally.eq(subjects::vote_tally + change.delta))
                .execute(conn)?;

            let tally = subjects::table
                .filter(subjects::id.eq(subject))
                .select(subjects::vote_tally)
                .first::<i64>(conn)?;
            Ok(tally)
        })
    }

    async fn audit_tally(&self, subject: &SubjectId) -> Result<Option<TallyAudit>> {
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let Some(stored) = subjects::table
                .filter(subjects::id.eq(subject.as_str()))
                .select(subjects::vote_tally)
                .first::<i64>(conn)
                .optional()?
            else {
                return Ok(None);
            };
            let values: Vec<i32> = votes::table
                .filter(votes::subject_id.eq(subject.as_str()))
                .select(votes::vote)
                .load(conn)?;
            Ok(Some(TallyAudit::from_votes(
                stored,
                values.into_iter().map(i64::from),
            )))
        })
    }
}

impl ChatStore for SqliteStore {
    async fn find_conversation(&self, pair: &UserPair) -> Result<Option<Conversation>> {
        let mut conn = self.conn()?;

        let row = conversations::table
            .filter(conversations::user_low.eq(pair.low().as_str()))
            .filter(conversations::user_high.eq(pair.high().as_str()))
            .select(ConversationRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Conversation::try_from).transpose()
    }

    async fn get_conversation(&self, id: &ConversationId) -> Result<Option<Conversation>> {
        let mut conn = self.conn()?;

        let row = conversations::table
            .find(id.as_str())
            .select(ConversationRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(Conversation::try_from).transpose()
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
        let row = ConversationRow::from(conversation);
        let mut conn = self.conn()?;

        match diesel::insert_into(conversations::table)
            .values(&row)
            .execute(&mut conn)
        {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(ConflictError::DuplicateConversation {
                low: row.user_low,
                high: row.user_high,
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_conversations(&self, user: &Username) -> Result<Vec<Conversation>> {
        let mut conn = self.conn()?;

        conversations::table
            .filter(
                conversations::user_low
                    .eq(user.as_str())
                    .or(conversations::user_high.eq(user.as_str())),
            )
            .select(ConversationRow::as_select())
            .order((conversations::created_at.asc(), conversations::id.asc()))
            .load(&mut conn)?
            .into_iter()
            .map(Conversation::try_from)
            .collect()
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<Option<usize>> {
        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            if !conversation_exists(conn, id.as_str())? {
                return Ok(None);
            }
            let removed =
                diesel::delete(messages::table.filter(messages::conversation_id.eq(id.as_str())))
                    .execute(conn)?;
            diesel::delete(conversations::table.find(id.as_str())).execute(conn)?;
            Ok(Some(removed))
        })
    }

    async fn append_message(&self, message: &Message) -> Result<()> {
        let row = NewMessageRow::from(message);
        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            if !conversation_exists(conn, &row.conversation_id)? {
                return Err(Error::not_found("conversation", &row.conversation_id));
            }
            diesel::insert_into(messages::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
    }

    async fn list_messages(&self, conversation: &ConversationId) -> Result<Vec<Message>> {
        let mut conn = self.conn()?;

        messages::table
            .filter(messages::conversation_id.eq(conversation.as_str()))
            .select(MessageRow::as_select())
            .order(messages::seq.asc())
            .load(&mut conn)?
            .into_iter()
            .map(Message::try_from)
            .collect()
    }
}
