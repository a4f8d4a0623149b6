//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`Username`], [`Subject`] and
//! [`UserPair`] so tests focus on assertions rather than construction
//! boilerplate.

use crate::domain::{Subject, UserPair, Username};

/// Create a [`Username`], panicking on a blank name.
pub fn user(name: &str) -> Username {
    Username::parse(name, "username").expect("test username must not be blank")
}

/// Generate `n` voter names `voter-0`, `voter-1`, ..., `voter-{n-1}`.
pub fn voters(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("voter-{i}")).collect()
}

/// A question by `author` with a fixed title and body.
pub fn question(author: &str) -> Subject {
    Subject::question(user(author), "A question", format!("Asked by {author}"))
        .expect("test question body is not blank")
}

/// An answer by `author` to `question`.
pub fn answer(question: &Subject, author: &str) -> Subject {
    Subject::answer(
        question.id.clone(),
        user(author),
        format!("Answered by {author}"),
    )
    .expect("test answer body is not blank")
}

/// Canonical pair of two distinct names.
pub fn pair(a: &str, b: &str) -> UserPair {
    UserPair::parse(a, b).expect("test pair must name two distinct users")
}
