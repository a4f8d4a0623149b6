//! Seeded random vote scripts.
//!
//! A script is a list of `(voter, requested)` pairs. [`expected_tally`]
//! replays it sequentially through [`decide`] so concurrency tests can
//! compare the store's tally with a linear history.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::domain::vote::{decide, Decision, RequestedVote, Vote};

/// `rounds` random requests in `{-1, 0, 1}` for each of `voters`.
///
/// Requests of one voter stay in order; voters are interleaved randomly.
pub fn random_script(voters: &[String], rounds: usize, seed: u64) -> Vec<(String, i64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut script: Vec<(String, i64)> = voters
        .iter()
        .flat_map(|voter| std::iter::repeat((voter.clone(), 0)).take(rounds))
        .collect();
    script.shuffle(&mut rng);
    for (_, requested) in &mut script {
        *requested = rng.gen_range(-1..=1);
    }
    script
}

/// Split a script into per-voter request lists, preserving order.
pub fn by_voter(script: &[(String, i64)]) -> HashMap<String, Vec<i64>> {
    let mut grouped: HashMap<String, Vec<i64>> = HashMap::new();
    for (voter, requested) in script {
        grouped.entry(voter.clone()).or_default().push(*requested);
    }
    grouped
}

/// Each voter's final vote after replaying the script in order.
///
/// Repeated votes are rejected and leave the vote unchanged.
pub fn final_votes(script: &[(String, i64)]) -> HashMap<String, Option<Vote>> {
    let mut held: HashMap<String, Option<Vote>> = HashMap::new();
    for (voter, requested) in script {
        let current = held.get(voter).copied().flatten();
        let requested = RequestedVote::parse(*requested).expect("script values are in range");
        let next = match decide(current, requested) {
            Decision::Apply(transition) => transition.resulting(),
            Decision::Repeated(vote) => Some(vote),
        };
        held.insert(voter.clone(), next);
    }
    held
}

/// Tally after replaying the script sequentially.
pub fn expected_tally(script: &[(String, i64)]) -> i64 {
    final_votes(script)
        .values()
        .flatten()
        .map(|vote| vote.value())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::voters;

    #[test]
    fn script_is_deterministic_per_seed() {
        let names = voters(4);
        assert_eq!(random_script(&names, 5, 7), random_script(&names, 5, 7));
        assert_eq!(random_script(&names, 5, 7).len(), 20);
    }

    #[test]
    fn by_voter_keeps_request_order() {
        let script = vec![
            ("a".to_string(), 1),
            ("b".to_string(), -1),
            ("a".to_string(), 0),
        ];
        assert_eq!(by_voter(&script)["a"], vec![1, 0]);
    }

    #[test]
    fn expected_tally_replays_transitions() {
        let script = vec![
            ("a".to_string(), 1),
            ("a".to_string(), 1),
            ("b".to_string(), -1),
            ("c".to_string(), 1),
            ("c".to_string(), 0),
            ("d".to_string(), -1),
            ("d".to_string(), 1),
        ];
        assert_eq!(expected_tally(&script), 1 - 1 + 1);
    }
}
