//! Questions and answers: creation, editing, moderation, lookup,
//! cascading removal and tally audits.

use std::sync::Arc;

use tracing::{debug, info, warn};

use chrono::Utc;

use crate::domain::{
    DeletedSubject, QuestionStatus, Subject, SubjectEdit, SubjectFilter, SubjectId, SubjectKind,
    TallyAudit, Username, VoteRecord,
};
use crate::error::{Error, Result};
use crate::port::inbound::NewQuestion;
use crate::port::outbound::store::{SubjectStore, VoteStore};

/// Use cases around vote subjects.
///
/// Tallies are never written here; only the vote ledger moves them.
pub struct SubjectService<S> {
    store: Arc<S>,
}

impl<S> SubjectService<S>
where
    S: SubjectStore + VoteStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Post a new question without a topic.
    pub async fn ask(&self, author: &str, title: &str, body: &str) -> Result<Subject> {
        self.post(NewQuestion::new(author, body).titled(title)).await
    }

    /// Post a new open question.
    pub async fn post(&self, request: NewQuestion) -> Result<Subject> {
        let author = Username::parse(&request.author, "author")?;
        let mut question = Subject::question(author, request.title, request.body)?;
        if let Some(topic) = request.topic {
            question = question.with_topic(topic)?;
        }
        self.store.insert_subject(&question).await?;
        info!(
            subject = %question.id,
            author = %question.author,
            topic = question.topic.as_deref().unwrap_or("-"),
            "Question created"
        );
        Ok(question)
    }

    /// Post an answer to an existing question.
    ///
    /// # Errors
    /// `NotFound` if `question` does not exist or is itself an answer.
    pub async fn answer(&self, question: &SubjectId, author: &str, body: &str) -> Result<Subject> {
        let author = Username::parse(author, "author")?;
        let answer = Subject::answer(question.clone(), author, body)?;

        self.question(question).await?;
        self.store.insert_subject(&answer).await?;
        info!(
            subject = %answer.id,
            question = %question,
            author = %answer.author,
            "Answer created"
        );
        Ok(answer)
    }

    pub async fn get(&self, id: &SubjectId) -> Result<Subject> {
        self.store
            .get_subject(id)
            .await?
            .ok_or_else(|| Error::not_found("subject", id))
    }

    /// Subjects matching `filter`, oldest first.
    pub async fn list(&self, filter: &SubjectFilter) -> Result<Vec<Subject>> {
        self.store.list_subjects(filter).await
    }

    /// Answers of a question, oldest first.
    pub async fn answers_for(&self, question: &SubjectId) -> Result<Vec<Subject>> {
        self.question(question).await?;
        self.store.list_answers(question).await
    }

    /// Change the text of a subject. The tally is left alone.
    ///
    /// # Errors
    /// - `NotFound` if the subject does not exist
    /// - `InvalidInput` for an empty edit, a blank body, or a title or
    ///   topic on an answer
    pub async fn edit(&self, id: &SubjectId, edit: SubjectEdit) -> Result<Subject> {
        let mut subject = self.get(id).await?;
        subject.apply_edit(edit, Utc::now())?;
        self.save(&subject).await?;
        info!(subject = %id, "Subject edited");
        Ok(subject)
    }

    /// Open, close or deny a question.
    pub async fn moderate(
        &self,
        id: &SubjectId,
        status: QuestionStatus,
        moderator: &str,
    ) -> Result<Subject> {
        let moderator = Username::parse(moderator, "moderator")?;
        let mut question = self.get(id).await?;
        question.set_status(status, moderator)?;
        self.save(&question).await?;
        info!(subject = %id, status = %status, "Question moderated");
        Ok(question)
    }

    /// Approve an answer, or withdraw its approval.
    pub async fn approve(&self, id: &SubjectId, approved: bool, moderator: &str) -> Result<Subject> {
        let moderator = Username::parse(moderator, "moderator")?;
        let mut answer = self.get(id).await?;
        answer.set_approval(approved, moderator)?;
        self.save(&answer).await?;
        info!(subject = %id, approved, "Answer approval changed");
        Ok(answer)
    }

    async fn question(&self, id: &SubjectId) -> Result<Subject> {
        match self.store.get_subject(id).await? {
            Some(parent) if parent.kind == SubjectKind::Question => Ok(parent),
            _ => Err(Error::not_found("question", id)),
        }
    }

    // The subject may be deleted between the read and the write.
    async fn save(&self, subject: &Subject) -> Result<()> {
        if self.store.update_subject(subject).await? {
            Ok(())
        } else {
            Err(Error::not_found("subject", &subject.id))
        }
    }

    /// Remove a subject and its vote records. Questions take their answers
    /// with them.
    pub async fn delete(&self, id: &SubjectId) -> Result<DeletedSubject> {
        let deleted = self
            .store
            .delete_subject(id)
            .await?
            .ok_or_else(|| Error::not_found("subject", id))?;
        info!(
            subject = %id,
            subjects = deleted.subjects,
            votes = deleted.votes,
            "Subject deleted"
        );
        Ok(deleted)
    }

    pub async fn votes_for(&self, id: &SubjectId) -> Result<Vec<VoteRecord>> {
        self.get(id).await?;
        self.store.list_votes(id).await
    }

    /// Compare the stored tally with a fresh sum of the live records.
    ///
    /// Both are read from one snapshot. A mismatch is reported, never
    /// repaired.
    pub async fn audit(&self, id: &SubjectId) -> Result<TallyAudit> {
        let audit = self
            .store
            .audit_tally(id)
            .await?
            .ok_or_else(|| Error::not_found("subject", id))?;

        if audit.is_consistent() {
            debug!(subject = %id, tally = audit.stored, "Tally consistent");
        } else {
            warn!(
                subject = %id,
                stored = audit.stored,
                recomputed = audit.recomputed,
                "Tally out of sync with vote records"
            );
        }
        Ok(audit)
    }
}
