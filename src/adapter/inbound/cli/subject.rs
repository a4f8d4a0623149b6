//! Handlers for question and answer commands.

use serde::Serialize;
use tabled::Tabled;

use crate::adapter::inbound::cli::command::{
    AnswerArgs, ApproveArgs, AskArgs, EditArgs, ListArgs, ModerateArgs, SubjectArg,
};
use crate::adapter::inbound::cli::output;
use crate::domain::{
    DeletedSubject, QuestionStatus, Subject, SubjectEdit, SubjectFilter, SubjectId, SubjectKind,
    TallyAudit, VoteRecord,
};
use crate::error::Result;
use crate::infrastructure::Services;
use crate::port::inbound::NewQuestion;

const EXCERPT_WIDTH: usize = 48;

#[derive(Tabled)]
struct SubjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Topic")]
    topic: String,
    #[tabled(rename = "Tally")]
    tally: String,
    #[tabled(rename = "Text")]
    text: String,
}

/// Status of a question, approval of an answer.
fn state(subject: &Subject) -> String {
    match (subject.kind, subject.status) {
        (SubjectKind::Question, Some(status)) => status.to_string(),
        (SubjectKind::Question, None) => "-".to_string(),
        (SubjectKind::Answer, _) if subject.approved => "approved".to_string(),
        (SubjectKind::Answer, _) => "pending".to_string(),
    }
}

impl From<&Subject> for SubjectRow {
    fn from(subject: &Subject) -> Self {
        let text = subject.title.as_deref().unwrap_or(&subject.body);
        Self {
            id: subject.id.to_string(),
            kind: subject.kind.to_string(),
            author: subject.author.to_string(),
            state: state(subject),
            topic: subject.topic.clone().unwrap_or_else(|| "-".to_string()),
            tally: format!("{:+}", subject.vote_tally),
            text: output::excerpt(text, EXCERPT_WIDTH),
        }
    }
}

#[derive(Tabled)]
struct VoteRow {
    #[tabled(rename = "Voter")]
    voter: String,
    #[tabled(rename = "Vote")]
    vote: String,
    #[tabled(rename = "Voted at")]
    voted_at: String,
}

impl From<&VoteRecord> for VoteRow {
    fn from(record: &VoteRecord) -> Self {
        Self {
            voter: record.voter.to_string(),
            vote: format!("{:+}", record.vote.value()),
            voted_at: record.voted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// A subject with what hangs off it.
#[derive(Serialize)]
struct SubjectDetail {
    subject: Subject,
    answers: Vec<Subject>,
    votes: Vec<VoteRecord>,
}

#[derive(Serialize)]
struct Removed {
    subject: SubjectId,
    #[serde(flatten)]
    removed: DeletedSubject,
}

#[derive(Serialize)]
struct Audit {
    subject: SubjectId,
    #[serde(flatten)]
    audit: TallyAudit,
    consistent: bool,
}

fn print_subject(subject: &Subject) {
    output::field("ID", output::highlight(&subject.id));
    output::field("Kind", subject.kind);
    if let Some(question) = &subject.question {
        output::field("Question", question);
    }
    output::field("Author", &subject.author);
    if let Some(title) = &subject.title {
        output::field("Title", title);
    }
    if let Some(topic) = &subject.topic {
        output::field("Topic", topic);
    }
    output::field("State", state(subject));
    if let Some(moderator) = &subject.approved_by {
        output::field("Moderator", moderator);
    }
    output::field("Tally", output::tally(subject.vote_tally));
    output::field("Created", subject.created_at.to_rfc3339());
    if let Some(edited) = &subject.edited_at {
        output::field("Edited", edited.to_rfc3339());
    }
    output::field("Body", output::excerpt(&subject.body, 72));
}

/// Execute `ask`.
pub async fn execute_ask(services: &Services, args: &AskArgs) -> Result<()> {
    let mut request = NewQuestion::new(&args.author, &args.body).titled(&args.title);
    request.topic.clone_from(&args.topic);
    let subject = services.subjects.post(request).await?;
    output::record("subject", &subject, |subject| {
        output::success("Question posted");
        print_subject(subject);
    });
    Ok(())
}

/// Execute `answer`.
pub async fn execute_answer(services: &Services, args: &AnswerArgs) -> Result<()> {
    let question = SubjectId::from(args.question.as_str());
    let subject = services
        .subjects
        .answer(&question, &args.author, &args.body)
        .await?;
    output::record("subject", &subject, |subject| {
        output::success("Answer posted");
        print_subject(subject);
    });
    Ok(())
}

/// Execute `show`.
pub async fn execute_show(services: &Services, args: &SubjectArg) -> Result<()> {
    let id = SubjectId::from(args.subject.as_str());
    let subject = services.subjects.get(&id).await?;
    let answers = match subject.kind {
        SubjectKind::Question => services.subjects.answers_for(&id).await?,
        SubjectKind::Answer => Vec::new(),
    };
    let votes = services.subjects.votes_for(&id).await?;
    let detail = SubjectDetail {
        subject,
        answers,
        votes,
    };

    output::record("subject_detail", &detail, |detail| {
        let heading = match detail.subject.kind {
            SubjectKind::Question => "Question",
            SubjectKind::Answer => "Answer",
        };
        output::section(heading);
        print_subject(&detail.subject);

        if detail.subject.kind == SubjectKind::Question {
            output::section("Answers");
            if detail.answers.is_empty() {
                output::note("(no answers)");
            } else {
                output::table(detail.answers.iter().map(SubjectRow::from));
            }
        }

        output::section("Votes");
        if detail.votes.is_empty() {
            output::note("(no votes)");
        } else {
            output::table(detail.votes.iter().map(VoteRow::from));
        }
    });
    Ok(())
}

fn list_filter(args: &ListArgs) -> SubjectFilter {
    let mut filter = match &args.question {
        Some(question) => SubjectFilter::answers_to(SubjectId::from(question.as_str())),
        None => SubjectFilter::all(),
    };
    if let Some(kind) = args.kind {
        filter.kind = Some(kind.into());
    }
    if let Some(status) = args.status {
        filter = filter.with_status(status.into());
    }
    if let Some(topic) = &args.topic {
        filter = filter.with_topic(topic.as_str());
    }
    if args.approved || args.unapproved {
        filter = filter.with_approved(args.approved);
    }
    filter
}

/// Execute `list`.
pub async fn execute_list(services: &Services, args: &ListArgs) -> Result<()> {
    let subjects = services.subjects.list(&list_filter(args)).await?;
    output::record("subjects", &subjects, |subjects| {
        if subjects.is_empty() {
            output::note("(no subjects)");
        } else {
            output::table(subjects.iter().map(SubjectRow::from));
        }
    });
    Ok(())
}

/// Execute `edit`.
pub async fn execute_edit(services: &Services, args: &EditArgs) -> Result<()> {
    let id = SubjectId::from(args.subject.as_str());
    let edit = SubjectEdit {
        title: args.title.clone(),
        body: args.body.clone(),
        topic: args.topic.clone(),
    };
    let subject = services.subjects.edit(&id, edit).await?;
    output::record("subject", &subject, |subject| {
        output::success("Subject edited");
        print_subject(subject);
    });
    Ok(())
}

/// Execute `moderate`.
pub async fn execute_moderate(services: &Services, args: &ModerateArgs) -> Result<()> {
    let id = SubjectId::from(args.question.as_str());
    let status = QuestionStatus::from(args.status);
    let subject = services
        .subjects
        .moderate(&id, status, &args.moderator)
        .await?;
    output::record("subject", &subject, |subject| {
        output::success(&format!("Question {status}"));
        print_subject(subject);
    });
    Ok(())
}

/// Execute `approve`.
pub async fn execute_approve(services: &Services, args: &ApproveArgs) -> Result<()> {
    let id = SubjectId::from(args.answer.as_str());
    let subject = services
        .subjects
        .approve(&id, !args.revoke, &args.moderator)
        .await?;
    output::record("subject", &subject, |subject| {
        if subject.approved {
            output::success("Answer approved");
        } else {
            output::success("Approval revoked");
        }
        print_subject(subject);
    });
    Ok(())
}

/// Execute `delete`.
pub async fn execute_delete(services: &Services, args: &SubjectArg) -> Result<()> {
    let id = SubjectId::from(args.subject.as_str());
    let removed = services.subjects.delete(&id).await?;
    let removed = Removed {
        subject: id,
        removed,
    };
    output::record("deleted", &removed, |removed| {
        output::success(&format!("Deleted {}", removed.subject));
        output::field("Subjects", removed.removed.subjects);
        output::field("Votes", removed.removed.votes);
    });
    Ok(())
}

/// Execute `audit`.
pub async fn execute_audit(services: &Services, args: &SubjectArg) -> Result<()> {
    let id = SubjectId::from(args.subject.as_str());
    let audit = services.subjects.audit(&id).await?;
    let audit = Audit {
        subject: id,
        consistent: audit.is_consistent(),
        audit,
    };
    output::record("audit", &audit, |audit| {
        output::field("Stored", output::tally(audit.audit.stored));
        output::field("Recomputed", output::tally(audit.audit.recomputed));
        output::field("Live votes", audit.audit.live_votes);
        if audit.consistent {
            output::success("Tally matches vote records");
        } else {
            output::warning("Tally does not match vote records");
        }
    });
    Ok(())
}
