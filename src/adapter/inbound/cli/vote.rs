//! Handler for `vote`.

use crate::adapter::inbound::cli::command::VoteArgs;
use crate::adapter::inbound::cli::output;
use crate::application::VoteOutcome;
use crate::domain::{SubjectId, Vote};
use crate::error::Result;
use crate::infrastructure::Services;
use crate::port::inbound::VoteRequest;

fn describe(vote: Option<Vote>) -> String {
    vote.map_or_else(|| output::muted("none"), |v| v.to_string())
}

fn headline(outcome: &VoteOutcome) -> &'static str {
    match (outcome.previous, outcome.current) {
        (None, None) => "No vote to retract",
        (None, Some(_)) => "Vote cast",
        (Some(_), None) => "Vote retracted",
        (Some(_), Some(_)) => "Vote switched",
    }
}

/// Execute `vote`.
pub async fn execute(services: &Services, args: &VoteArgs) -> Result<()> {
    let request = VoteRequest::new(
        SubjectId::from(args.subject.as_str()),
        &args.voter,
        args.value,
    );
    let outcome = services.ledger.apply(request).await?;

    output::record("vote", &outcome, |outcome| {
        output::success(headline(outcome));
        output::field("Subject", &outcome.subject);
        output::field("Voter", &outcome.voter);
        output::field(
            "Vote",
            format!(
                "{} -> {}",
                describe(outcome.previous),
                describe(outcome.current)
            ),
        );
        output::field("Delta", format!("{:+}", outcome.delta));
        output::field("Tally", output::tally(outcome.tally));
    });
    Ok(())
}
