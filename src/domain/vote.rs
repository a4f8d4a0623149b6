//! Vote values, vote records and the per-voter transition rules.
//!
//! A voter holds at most one live vote per subject. Each incoming request is
//! resolved against the voter's current vote by [`decide`], which yields
//! either a [`Transition`] (with the exact tally delta to apply) or a
//! [`Decision::Repeated`] rejection. The function is pure so every rule can
//! be tested without a store.
//!
//! | current | requested | result            | delta     |
//! |---------|-----------|-------------------|-----------|
//! | none    | ±1        | cast              | requested |
//! | none    | 0         | unchanged         | 0         |
//! | v       | 0         | retract           | -v        |
//! | v       | v         | repeated (reject) | 0         |
//! | v       | -v        | switch            | 2 × new   |

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{SubjectId, VoteId};
use super::user::Username;

/// A live vote: up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    /// Positive endorsement, contributes +1.
    Up,
    /// Negative endorsement, contributes -1.
    Down,
}

impl Vote {
    /// Contribution of this vote to the subject tally.
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Map a stored integer back to a vote. Zero and anything else is `None`.
    #[must_use]
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Up),
            -1 => Some(Self::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// The vote a voter asks for: cast one, or retract whatever they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedVote {
    /// Hold this vote after the request.
    Cast(Vote),
    /// Hold no vote after the request (wire value `0`).
    Retract,
}

impl RequestedVote {
    /// Parse the wire value `{-1, 0, 1}`.
    ///
    /// # Errors
    /// Returns [`DomainError::VoteOutOfRange`] for any other value.
    pub fn parse(value: i64) -> Result<Self, DomainError> {
        match value {
            0 => Ok(Self::Retract),
            v => Vote::from_value(v)
                .map(Self::Cast)
                .ok_or(DomainError::VoteOutOfRange { value }),
        }
    }

    /// Wire value of this request.
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Self::Cast(vote) => vote.value(),
            Self::Retract => 0,
        }
    }
}

/// A stored vote of one voter on one subject.
///
/// At most one record exists per `(subject, voter)`. Retraction deletes the
/// record; a zero-valued record is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: VoteId,
    pub subject: SubjectId,
    pub voter: Username,
    pub vote: Vote,
    pub voted_at: DateTime<Utc>,
}

impl VoteRecord {
    /// Create a fresh record with a generated id.
    #[must_use]
    pub fn new(subject: SubjectId, voter: Username, vote: Vote) -> Self {
        Self {
            id: VoteId::new(),
            subject,
            voter,
            vote,
            voted_at: Utc::now(),
        }
    }
}

/// An accepted state change for one `(subject, voter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No prior vote; a new record is created.
    Cast(Vote),
    /// Prior vote flipped to its opposite; the record is updated in place.
    Switch { from: Vote, to: Vote },
    /// Prior vote withdrawn; the record is removed.
    Retract(Vote),
    /// No prior vote and nothing requested.
    Unchanged,
}

impl Transition {
    /// Amount to add to the subject tally.
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Cast(vote) => vote.value(),
            Self::Switch { to, .. } => 2 * to.value(),
            Self::Retract(vote) => -vote.value(),
            Self::Unchanged => 0,
        }
    }

    /// The voter's vote once the transition is applied.
    #[must_use]
    pub const fn resulting(self) -> Option<Vote> {
        match self {
            Self::Cast(vote) => Some(vote),
            Self::Switch { to, .. } => Some(to),
            Self::Retract(_) | Self::Unchanged => None,
        }
    }

    /// Whether the transition touches storage at all.
    #[must_use]
    pub const fn is_noop(self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Outcome of resolving a request against the current vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request changes state (or is an accepted no-op).
    Apply(Transition),
    /// The voter already holds exactly this vote.
    Repeated(Vote),
}

/// Resolve a request against the voter's current vote.
#[must_use]
pub const fn decide(current: Option<Vote>, requested: RequestedVote) -> Decision {
    match (current, requested) {
        (None, RequestedVote::Cast(vote)) => Decision::Apply(Transition::Cast(vote)),
        (None, RequestedVote::Retract) => Decision::Apply(Transition::Unchanged),
        (Some(held), RequestedVote::Retract) => Decision::Apply(Transition::Retract(held)),
        (Some(held), RequestedVote::Cast(vote)) => {
            if held.value() == vote.value() {
                Decision::Repeated(held)
            } else {
                Decision::Apply(Transition::Switch { from: held, to: vote })
            }
        }
    }
}

/// Record-level effect of a transition, as handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordAction {
    /// Insert a new record.
    Insert(VoteRecord),
    /// Overwrite the vote of an existing record still holding `expected`.
    Update {
        id: VoteId,
        expected: Vote,
        vote: Vote,
        voted_at: DateTime<Utc>,
    },
    /// Remove an existing record still holding `expected`.
    Delete { id: VoteId, expected: Vote },
}

/// A record change plus the tally delta it implies.
///
/// Stores must apply both halves in one atomic unit, and must apply the
/// delta relative to the stored tally (never as an absolute overwrite) so
/// that concurrent voters on one subject cannot lose each other's updates.
/// Updates and deletes only apply while the record still holds the vote the
/// delta was computed from; otherwise the store reports `StaleVote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteChange {
    pub subject: SubjectId,
    pub action: RecordAction,
    pub delta: i64,
}

impl VoteChange {
    /// Build the change for `transition` given the voter's existing record.
    ///
    /// Returns `None` for [`Transition::Unchanged`]. `existing` must be
    /// `Some` for switch and retract transitions.
    #[must_use]
    pub fn from_transition(
        subject: &SubjectId,
        voter: &Username,
        existing: Option<&VoteRecord>,
        transition: Transition,
    ) -> Option<Self> {
        let action = match (transition, existing) {
            (Transition::Cast(vote), _) => {
                RecordAction::Insert(VoteRecord::new(subject.clone(), voter.clone(), vote))
            }
            (Transition::Switch { from, to }, Some(record)) => RecordAction::Update {
                id: record.id.clone(),
                expected: from,
                vote: to,
                voted_at: Utc::now(),
            },
            (Transition::Retract(held), Some(record)) => RecordAction::Delete {
                id: record.id.clone(),
                expected: held,
            },
            _ => return None,
        };

        Some(Self {
            subject: subject.clone(),
            action,
            delta: transition.delta(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter() -> Username {
        Username::parse("alice", "voter").unwrap()
    }

    #[test]
    fn parse_accepts_wire_values() {
        assert_eq!(RequestedVote::parse(1), Ok(RequestedVote::Cast(Vote::Up)));
        assert_eq!(RequestedVote::parse(-1), Ok(RequestedVote::Cast(Vote::Down)));
        assert_eq!(RequestedVote::parse(0), Ok(RequestedVote::Retract));
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert_eq!(
            RequestedVote::parse(5),
            Err(DomainError::VoteOutOfRange { value: 5 })
        );
        assert!(RequestedVote::parse(-2).is_err());
    }

    #[test]
    fn first_vote_adds_its_value() {
        let up = decide(None, RequestedVote::Cast(Vote::Up));
        assert_eq!(up, Decision::Apply(Transition::Cast(Vote::Up)));
        assert_eq!(Transition::Cast(Vote::Up).delta(), 1);
        assert_eq!(Transition::Cast(Vote::Down).delta(), -1);
    }

    #[test]
    fn retract_without_vote_is_unchanged() {
        let decision = decide(None, RequestedVote::Retract);
        assert_eq!(decision, Decision::Apply(Transition::Unchanged));
        assert_eq!(Transition::Unchanged.delta(), 0);
        assert!(Transition::Unchanged.is_noop());
    }

    #[test]
    fn retract_removes_held_value() {
        let decision = decide(Some(Vote::Down), RequestedVote::Retract);
        assert_eq!(decision, Decision::Apply(Transition::Retract(Vote::Down)));
        assert_eq!(Transition::Retract(Vote::Down).delta(), 1);
        assert_eq!(Transition::Retract(Vote::Up).delta(), -1);
        assert_eq!(Transition::Retract(Vote::Up).resulting(), None);
    }

    #[test]
    fn repeating_a_vote_is_rejected() {
        assert_eq!(
            decide(Some(Vote::Up), RequestedVote::Cast(Vote::Up)),
            Decision::Repeated(Vote::Up)
        );
        assert_eq!(
            decide(Some(Vote::Down), RequestedVote::Cast(Vote::Down)),
            Decision::Repeated(Vote::Down)
        );
    }

    #[test]
    fn switching_swings_by_two() {
        let up = decide(Some(Vote::Down), RequestedVote::Cast(Vote::Up));
        let Decision::Apply(transition) = up else {
            panic!("expected switch");
        };
        assert_eq!(transition.delta(), 2);
        assert_eq!(transition.resulting(), Some(Vote::Up));

        let down = Transition::Switch {
            from: Vote::Up,
            to: Vote::Down,
        };
        assert_eq!(down.delta(), -2);
    }

    #[test]
    fn change_for_cast_inserts_record() {
        let subject = SubjectId::new();
        let change =
            VoteChange::from_transition(&subject, &voter(), None, Transition::Cast(Vote::Up))
                .unwrap();
        assert_eq!(change.delta, 1);
        match change.action {
            RecordAction::Insert(record) => {
                assert_eq!(record.subject, subject);
                assert_eq!(record.voter, voter());
                assert_eq!(record.vote, Vote::Up);
            }
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[test]
    fn change_for_switch_and_retract_targets_existing_record() {
        let subject = SubjectId::new();
        let existing = VoteRecord::new(subject.clone(), voter(), Vote::Down);

        let switch = VoteChange::from_transition(
            &subject,
            &voter(),
            Some(&existing),
            Transition::Switch {
                from: Vote::Down,
                to: Vote::Up,
            },
        )
        .unwrap();
        assert!(matches!(
            switch.action,
            RecordAction::Update {
                ref id,
                expected: Vote::Down,
                vote: Vote::Up,
                ..
            } if *id == existing.id
        ));

        let retract = VoteChange::from_transition(
            &subject,
            &voter(),
            Some(&existing),
            Transition::Retract(Vote::Down),
        )
        .unwrap();
        assert_eq!(
            retract.action,
            RecordAction::Delete {
                id: existing.id.clone(),
                expected: Vote::Down,
            }
        );
        assert_eq!(retract.delta, 1);
    }

    #[test]
    fn unchanged_produces_no_change() {
        let subject = SubjectId::new();
        assert!(
            VoteChange::from_transition(&subject, &voter(), None, Transition::Unchanged)
                .is_none()
        );
    }
}
