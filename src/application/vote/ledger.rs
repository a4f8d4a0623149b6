//! The vote ledger: per-voter vote state and the subject tally.
//!
//! Every request runs read, decide and write for its `(subject, voter)`
//! under a keyed lock, then hands one [`VoteChange`] to the store, which
//! commits the record change and the relative tally update together.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::application::lock::KeyedLocks;
use crate::domain::vote::decide;
use crate::domain::{
    Decision, RequestedVote, SubjectId, Username, Vote, VoteChange, VoteRecord,
};
use crate::error::{ConflictError, Error, Result};
use crate::port::inbound::VoteRequest;
use crate::port::outbound::store::{SubjectStore, VoteStore};

/// Result of an accepted vote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    pub subject: SubjectId,
    pub voter: Username,
    /// Vote held before the request.
    pub previous: Option<Vote>,
    /// Vote held after the request.
    pub current: Option<Vote>,
    /// Amount the tally moved by.
    pub delta: i64,
    /// Tally after the request.
    pub tally: i64,
}

/// Applies vote requests and keeps subject tallies in sync.
pub struct VoteLedger<S> {
    store: Arc<S>,
    locks: KeyedLocks<(SubjectId, Username)>,
}

impl<S> VoteLedger<S>
where
    S: SubjectStore + VoteStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Apply one vote request.
    ///
    /// # Errors
    /// - `Domain` for a blank voter or a value outside `{-1, 0, 1}`
    /// - `NotFound` if the subject does not exist
    /// - `Conflict(RepeatedVote)` if the voter already holds the requested vote
    /// - `Conflict(StaleVote)` if another writer changed the voter's record
    ///   between the read and the commit; nothing is applied
    pub async fn apply(&self, request: VoteRequest) -> Result<VoteOutcome> {
        let voter = Username::parse(&request.voter, "voter")?;
        let requested = RequestedVote::parse(request.requested)?;

        let subject = self
            .store
            .get_subject(&request.subject)
            .await?
            .ok_or_else(|| Error::not_found("subject", &request.subject))?;

        let _guard = self.locks.lock((subject.id.clone(), voter.clone())).await;

        let existing = self.store.find_vote(&subject.id, &voter).await?;
        let previous = existing.as_ref().map(|record| record.vote);

        let transition = match decide(previous, requested) {
            Decision::Apply(transition) => transition,
            Decision::Repeated(vote) => {
                debug!(
                    subject = %subject.id,
                    voter = %voter,
                    %vote,
                    "Repeated vote rejected"
                );
                return Err(ConflictError::RepeatedVote {
                    subject: subject.id.to_string(),
                    voter: voter.to_string(),
                    vote,
                }
                .into());
            }
        };

        debug!(
            subject = %subject.id,
            voter = %voter,
            ?previous,
            requested = requested.value(),
            ?transition,
            "Vote decided"
        );

        let Some(change) =
            VoteChange::from_transition(&subject.id, &voter, existing.as_ref(), transition)
        else {
            // Nothing held and nothing requested: report the tally as stored now.
            let current = self
                .store
                .get_subject(&subject.id)
                .await?
                .ok_or_else(|| Error::not_found("subject", &subject.id))?;
            return Ok(VoteOutcome {
                subject: subject.id,
                voter,
                previous,
                current: None,
                delta: 0,
                tally: current.vote_tally,
            });
        };

        let tally = self.store.commit_vote(&change).await?;

        info!(
            subject = %subject.id,
            voter = %voter,
            delta = change.delta,
            tally,
            "Vote committed"
        );

        Ok(VoteOutcome {
            subject: subject.id,
            voter,
            previous,
            current: transition.resulting(),
            delta: change.delta,
            tally,
        })
    }

    /// Live votes on a subject.
    ///
    /// # Errors
    /// `NotFound` if the subject does not exist.
    pub async fn votes_for(&self, subject: &SubjectId) -> Result<Vec<VoteRecord>> {
        if self.store.get_subject(subject).await?.is_none() {
            return Err(Error::not_found("subject", subject));
        }
        self.store.list_votes(subject).await
    }
}
