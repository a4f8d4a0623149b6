//! Vote subjects: questions and answers carrying a denormalized tally.
//!
//! Besides the tally, questions carry a moderation [`QuestionStatus`] and an
//! optional topic, and answers carry an approval flag. None of those touch
//! the tally.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::SubjectId;
use super::user::Username;

/// Kind of votable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Question,
    Answer,
}

impl SubjectKind {
    /// Stable storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "question" => Ok(Self::Question),
            "answer" => Ok(Self::Answer),
            other => Err(format!("unknown subject kind '{other}'")),
        }
    }
}

/// Moderation state of a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    #[default]
    Open,
    Closed,
    Denied,
}

impl QuestionStatus {
    /// Stable storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "denied" => Ok(Self::Denied),
            other => Err(format!("unknown question status '{other}'")),
        }
    }
}

/// A question or answer that can receive votes.
///
/// `vote_tally` is the materialized sum of the subject's live vote records.
/// Only the vote ledger changes it, and always together with the record it
/// accounts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub kind: SubjectKind,
    /// Parent question, set for answers only.
    pub question: Option<SubjectId>,
    pub author: Username,
    pub title: Option<String>,
    pub body: String,
    /// Questions only.
    pub topic: Option<String>,
    /// Set for questions, `None` for answers.
    pub status: Option<QuestionStatus>,
    /// Answers only; always `false` for questions.
    pub approved: bool,
    /// Moderator of the last status or approval change.
    pub approved_by: Option<Username>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub vote_tally: i64,
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Subject {
    /// Create a new open question with a zero tally.
    ///
    /// # Errors
    /// Returns [`DomainError::EmptyBody`] if `body` is blank.
    pub fn question(
        author: Username,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let mut question = Self::build(SubjectKind::Question, None, author, body.into())?;
        question.title = non_blank(title.into());
        question.status = Some(QuestionStatus::Open);
        Ok(question)
    }

    /// Create a new, unapproved answer to `question` with a zero tally.
    ///
    /// # Errors
    /// Returns [`DomainError::EmptyBody`] if `body` is blank.
    pub fn answer(
        question: SubjectId,
        author: Username,
        body: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Self::build(SubjectKind::Answer, Some(question), author, body.into())
    }

    /// File a question under `topic`. A blank topic clears it.
    ///
    /// # Errors
    /// Returns [`DomainError::WrongSubjectKind`] for answers.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Result<Self, DomainError> {
        self.require(SubjectKind::Question, "file a topic on")?;
        self.topic = non_blank(topic.into());
        Ok(self)
    }

    fn build(
        kind: SubjectKind,
        question: Option<SubjectId>,
        author: Username,
        body: String,
    ) -> Result<Self, DomainError> {
        if body.trim().is_empty() {
            return Err(DomainError::EmptyBody);
        }
        Ok(Self {
            id: SubjectId::new(),
            kind,
            question,
            author,
            title: None,
            body,
            topic: None,
            status: None,
            approved: false,
            approved_by: None,
            created_at: Utc::now(),
            edited_at: None,
            vote_tally: 0,
        })
    }

    fn require(&self, kind: SubjectKind, operation: &'static str) -> Result<(), DomainError> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(DomainError::WrongSubjectKind {
                operation,
                kind: self.kind.as_str(),
            })
        }
    }

    /// Apply an edit. Fields absent from `edit` keep their value.
    ///
    /// # Errors
    /// - [`DomainError::EmptyEdit`] if nothing is set
    /// - [`DomainError::EmptyBody`] for a blank body
    /// - [`DomainError::WrongSubjectKind`] for a title or topic on an answer
    pub fn apply_edit(&mut self, edit: SubjectEdit, at: DateTime<Utc>) -> Result<(), DomainError> {
        if edit.is_empty() {
            return Err(DomainError::EmptyEdit);
        }
        if edit.title.is_some() {
            self.require(SubjectKind::Question, "set a title on")?;
        }
        if edit.topic.is_some() {
            self.require(SubjectKind::Question, "file a topic on")?;
        }
        if let Some(body) = &edit.body {
            if body.trim().is_empty() {
                return Err(DomainError::EmptyBody);
            }
        }

        if let Some(title) = edit.title {
            self.title = non_blank(title);
        }
        if let Some(topic) = edit.topic {
            self.topic = non_blank(topic);
        }
        if let Some(body) = edit.body {
            self.body = body;
        }
        self.edited_at = Some(at);
        Ok(())
    }

    /// Record a moderation decision on a question.
    ///
    /// # Errors
    /// Returns [`DomainError::WrongSubjectKind`] for answers.
    pub fn set_status(
        &mut self,
        status: QuestionStatus,
        moderator: Username,
    ) -> Result<(), DomainError> {
        self.require(SubjectKind::Question, "set the status of")?;
        self.status = Some(status);
        self.approved_by = Some(moderator);
        Ok(())
    }

    /// Approve or withdraw approval of an answer.
    ///
    /// # Errors
    /// Returns [`DomainError::WrongSubjectKind`] for questions.
    pub fn set_approval(&mut self, approved: bool, moderator: Username) -> Result<(), DomainError> {
        self.require(SubjectKind::Answer, "approve")?;
        self.approved = approved;
        self.approved_by = Some(moderator);
        Ok(())
    }
}

/// Requested changes to a subject's text. `None` keeps the current value;
/// a blank title or topic clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub topic: Option<String>,
}

impl SubjectEdit {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.topic.is_none()
    }
}

/// Listing criteria. Unset fields match everything.
///
/// `status` and `topic` only ever match questions; `question` and
/// `approved` only ever match answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectFilter {
    pub kind: Option<SubjectKind>,
    pub question: Option<SubjectId>,
    pub status: Option<QuestionStatus>,
    pub topic: Option<String>,
    pub approved: Option<bool>,
}

impl SubjectFilter {
    /// Everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn of_kind(kind: SubjectKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Answers of one question.
    #[must_use]
    pub fn answers_to(question: SubjectId) -> Self {
        Self {
            question: Some(question),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: QuestionStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into().trim().to_string());
        self
    }

    #[must_use]
    pub fn with_approved(mut self, approved: bool) -> Self {
        self.approved = Some(approved);
        self
    }

    /// The kind every match must have, if the criteria pin one down.
    ///
    /// `None` inside `Some` means the criteria contradict each other and
    /// nothing can match.
    #[must_use]
    pub fn required_kind(&self) -> Option<Option<SubjectKind>> {
        let question_only = self.status.is_some() || self.topic.is_some();
        let answer_only = self.question.is_some() || self.approved.is_some();
        let implied = match (question_only, answer_only) {
            (true, true) => return Some(None),
            (true, false) => Some(SubjectKind::Question),
            (false, true) => Some(SubjectKind::Answer),
            (false, false) => None,
        };
        match (self.kind, implied) {
            (Some(kind), Some(other)) if kind != other => Some(None),
            (Some(kind), _) | (None, Some(kind)) => Some(Some(kind)),
            (None, None) => None,
        }
    }

    /// Whether `subject` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, subject: &Subject) -> bool {
        match self.required_kind() {
            Some(None) => return false,
            Some(Some(kind)) if subject.kind != kind => return false,
            _ => {}
        }
        self.question
            .as_ref()
            .map_or(true, |q| subject.question.as_ref() == Some(q))
            && self.status.map_or(true, |s| subject.status == Some(s))
            && self
                .topic
                .as_deref()
                .map_or(true, |t| subject.topic.as_deref() == Some(t))
            && self.approved.map_or(true, |a| subject.approved == a)
    }
}

/// Result of removing a subject and everything that hangs off it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletedSubject {
    /// Subjects removed (the target plus, for questions, its answers).
    pub subjects: usize,
    /// Vote records removed across all of those subjects.
    pub votes: usize,
}

/// Comparison of the stored tally with a fresh sum of live records, both
/// read from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TallyAudit {
    pub stored: i64,
    pub recomputed: i64,
    pub live_votes: usize,
}

impl TallyAudit {
    /// Build an audit from the stored tally and the live vote values.
    #[must_use]
    pub fn from_votes(stored: i64, votes: impl IntoIterator<Item = i64>) -> Self {
        let (recomputed, live_votes) = votes
            .into_iter()
            .fold((0, 0), |(sum, count), value| (sum + value, count + 1));
        Self {
            stored,
            recomputed,
            live_votes,
        }
    }

    /// Whether stored and recomputed tallies agree.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.stored == self.recomputed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Username {
        Username::parse("carol", "author").unwrap()
    }

    fn moderator() -> Username {
        Username::parse("mod", "moderator").unwrap()
    }

    #[test]
    fn question_starts_open_with_zero_tally() {
        let q = Subject::question(author(), "Title", "How?").unwrap();
        assert_eq!(q.kind, SubjectKind::Question);
        assert_eq!(q.vote_tally, 0);
        assert_eq!(q.title.as_deref(), Some("Title"));
        assert_eq!(q.status, Some(QuestionStatus::Open));
        assert!(q.question.is_none());
    }

    #[test]
    fn blank_title_is_dropped() {
        let q = Subject::question(author(), "  ", "How?").unwrap();
        assert!(q.title.is_none());
    }

    #[test]
    fn answer_references_question() {
        let q = Subject::question(author(), "T", "Q").unwrap();
        let a = Subject::answer(q.id.clone(), author(), "A").unwrap();
        assert_eq!(a.kind, SubjectKind::Answer);
        assert_eq!(a.question, Some(q.id));
        assert_eq!(a.status, None);
        assert!(!a.approved);
    }

    #[test]
    fn empty_body_is_rejected() {
        assert_eq!(
            Subject::question(author(), "T", " ").unwrap_err(),
            DomainError::EmptyBody
        );
    }

    #[test]
    fn kind_and_status_parse_from_storage_names() {
        assert_eq!("answer".parse::<SubjectKind>(), Ok(SubjectKind::Answer));
        assert!("comment".parse::<SubjectKind>().is_err());
        assert_eq!("denied".parse::<QuestionStatus>(), Ok(QuestionStatus::Denied));
        assert!("pending".parse::<QuestionStatus>().is_err());
    }

    #[test]
    fn topic_is_trimmed_and_question_only() {
        let q = Subject::question(author(), "", "Q")
            .unwrap()
            .with_topic(" rust ")
            .unwrap();
        assert_eq!(q.topic.as_deref(), Some("rust"));

        let a = Subject::answer(q.id, author(), "A").unwrap();
        assert!(matches!(
            a.with_topic("rust"),
            Err(DomainError::WrongSubjectKind { kind: "answer", .. })
        ));
    }

    #[test]
    fn edit_keeps_unset_fields_and_tally() {
        let mut q = Subject::question(author(), "Old", "Body").unwrap();
        q.vote_tally = 3;
        let at = Utc::now();

        q.apply_edit(
            SubjectEdit {
                body: Some("New body".into()),
                ..SubjectEdit::default()
            },
            at,
        )
        .unwrap();

        assert_eq!(q.title.as_deref(), Some("Old"));
        assert_eq!(q.body, "New body");
        assert_eq!(q.vote_tally, 3);
        assert_eq!(q.edited_at, Some(at));
    }

    #[test]
    fn edit_rejections_leave_subject_untouched() {
        let q = Subject::question(author(), "T", "Q").unwrap();
        let mut a = Subject::answer(q.id, author(), "A").unwrap();
        let before = a.clone();

        assert_eq!(
            a.apply_edit(SubjectEdit::default(), Utc::now()),
            Err(DomainError::EmptyEdit)
        );
        let title = SubjectEdit {
            title: Some("x".into()),
            body: Some("changed".into()),
            ..SubjectEdit::default()
        };
        assert!(a.apply_edit(title, Utc::now()).is_err());
        let blank = SubjectEdit {
            body: Some("  ".into()),
            ..SubjectEdit::default()
        };
        assert_eq!(a.apply_edit(blank, Utc::now()), Err(DomainError::EmptyBody));
        assert_eq!(a, before);
    }

    #[test]
    fn moderation_applies_to_the_right_kind() {
        let mut q = Subject::question(author(), "T", "Q").unwrap();
        let mut a = Subject::answer(q.id.clone(), author(), "A").unwrap();

        q.set_status(QuestionStatus::Closed, moderator()).unwrap();
        assert_eq!(q.status, Some(QuestionStatus::Closed));
        assert_eq!(q.approved_by, Some(moderator()));
        assert!(q.set_approval(true, moderator()).is_err());

        a.set_approval(true, moderator()).unwrap();
        assert!(a.approved);
        assert!(a.set_status(QuestionStatus::Denied, moderator()).is_err());
    }

    #[test]
    fn filter_matches_by_criteria() {
        let q = Subject::question(author(), "", "Q")
            .unwrap()
            .with_topic("rust")
            .unwrap();
        let mut a = Subject::answer(q.id.clone(), author(), "A").unwrap();
        a.approved = true;

        assert!(SubjectFilter::all().matches(&q));
        assert!(SubjectFilter::all().with_topic("rust").matches(&q));
        assert!(!SubjectFilter::all().with_topic("go").matches(&q));
        assert!(SubjectFilter::all().with_status(QuestionStatus::Open).matches(&q));
        assert!(!SubjectFilter::all().with_status(QuestionStatus::Open).matches(&a));
        assert!(SubjectFilter::answers_to(q.id.clone()).with_approved(true).matches(&a));
        assert!(!SubjectFilter::all().with_approved(false).matches(&a));
        assert!(!SubjectFilter::all().with_approved(false).matches(&q));
    }

    #[test]
    fn contradictory_filter_matches_nothing() {
        let filter = SubjectFilter::of_kind(SubjectKind::Answer).with_topic("rust");
        assert_eq!(filter.required_kind(), Some(None));
        let q = Subject::question(author(), "", "Q")
            .unwrap()
            .with_topic("rust")
            .unwrap();
        assert!(!filter.matches(&q));
    }

    #[test]
    fn audit_sums_live_votes() {
        let audit = TallyAudit::from_votes(1, [1, 1, -1]);
        assert_eq!(audit.recomputed, 1);
        assert_eq!(audit.live_votes, 3);
        assert!(audit.is_consistent());
    }
}
