//! Concurrent votes and first contacts on the multi-threaded runtime.

mod support;

use std::sync::Arc;

use qa_ledger::application::{ChatResolver, SubjectService, VoteLedger};
use qa_ledger::domain::{
    DeletedSubject, Subject, SubjectFilter, SubjectId, TallyAudit, Username, Vote, VoteChange,
    VoteRecord,
};
use qa_ledger::error::{ConflictError, Error, ErrorKind, Result};
use qa_ledger::infrastructure::factory::LedgerStore;
use qa_ledger::port::inbound::VoteRequest;
use qa_ledger::port::outbound::store::{ChatStore, SubjectStore, VoteStore};
use qa_ledger::testkit::domain::{pair, voters};
use qa_ledger::testkit::votes::{by_voter, expected_tally, random_script};
use tokio::sync::Barrier;

use support::memory_services;
use support::temp_db::TempDb;

type Store = Arc<LedgerStore>;

fn sqlite(db: &TempDb) -> Store {
    Arc::new(LedgerStore::Sqlite(db.store()))
}

fn sqlite_reopened(db: &TempDb) -> Store {
    Arc::new(LedgerStore::Sqlite(Arc::new(db.reopen())))
}

fn memory() -> Store {
    Arc::new(memory_services().store)
}

/// A store whose `find_vote` waits until every ledger sharing the barrier
/// has read, so all of them decide from the same record.
struct ReadInLockstep {
    inner: Store,
    barrier: Arc<Barrier>,
}

impl ReadInLockstep {
    fn ledger(inner: Store, barrier: &Arc<Barrier>) -> Arc<VoteLedger<Self>> {
        Arc::new(VoteLedger::new(Arc::new(Self {
            inner,
            barrier: Arc::clone(barrier),
        })))
    }
}

impl SubjectStore for ReadInLockstep {
    async fn insert_subject(&self, subject: &Subject) -> Result<()> {
        self.inner.insert_subject(subject).await
    }

    async fn get_subject(&self, id: &SubjectId) -> Result<Option<Subject>> {
        self.inner.get_subject(id).await
    }

    async fn list_subjects(&self, filter: &SubjectFilter) -> Result<Vec<Subject>> {
        self.inner.list_subjects(filter).await
    }

    async fn update_subject(&self, subject: &Subject) -> Result<bool> {
        self.inner.update_subject(subject).await
    }

    async fn list_answers(&self, question: &SubjectId) -> Result<Vec<Subject>> {
        self.inner.list_answers(question).await
    }

    async fn delete_subject(&self, id: &SubjectId) -> Result<Option<DeletedSubject>> {
        self.inner.delete_subject(id).await
    }
}

impl VoteStore for ReadInLockstep {
    async fn find_vote(&self, subject: &SubjectId, voter: &Username) -> Result<Option<VoteRecord>> {
        let found = self.inner.find_vote(subject, voter).await;
        self.barrier.wait().await;
        found
    }

    async fn list_votes(&self, subject: &SubjectId) -> Result<Vec<VoteRecord>> {
        self.inner.list_votes(subject).await
    }

    async fn commit_vote(&self, change: &VoteChange) -> Result<i64> {
        self.inner.commit_vote(change).await
    }

    async fn audit_tally(&self, subject: &SubjectId) -> Result<Option<TallyAudit>> {
        self.inner.audit_tally(subject).await
    }
}

async fn ask(store: Store) -> SubjectId {
    SubjectService::new(store)
        .ask("carol", "", "Is this linearizable?")
        .await
        .unwrap()
        .id
}

/// One task per voter, each replaying its own requests in order.
async fn run_script(
    ledger: Arc<VoteLedger<LedgerStore>>,
    subject: &SubjectId,
    script: &[(String, i64)],
) {
    let mut handles = Vec::new();
    for (voter, requests) in by_voter(script) {
        let ledger = Arc::clone(&ledger);
        let subject = subject.clone();
        handles.push(tokio::spawn(async move {
            for requested in requests {
                let result = ledger
                    .apply(VoteRequest::new(subject.clone(), &voter, requested))
                    .await;
                if let Err(err) = result {
                    assert_eq!(err.kind(), ErrorKind::Conflict, "{err}");
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

async fn check_distinct_voters(store: Store) {
    let subject = ask(Arc::clone(&store)).await;
    let script = random_script(&voters(16), 6, 7);
    let ledger = Arc::new(VoteLedger::new(Arc::clone(&store)));

    run_script(ledger, &subject, &script).await;

    let tally = store.get_subject(&subject).await.unwrap().unwrap().vote_tally;
    let live: i64 = store
        .list_votes(&subject)
        .await
        .unwrap()
        .iter()
        .map(|v| v.vote.value())
        .sum();
    assert_eq!(tally, expected_tally(&script));
    assert_eq!(tally, live);
}

async fn check_same_voter(store: Store) {
    let subject = ask(Arc::clone(&store)).await;
    let ledger = Arc::new(VoteLedger::new(Arc::clone(&store)));
    let barrier = Arc::new(Barrier::new(8));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = Arc::clone(&ledger);
        let barrier = Arc::clone(&barrier);
        let subject = subject.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            ledger
                .apply(VoteRequest::new(subject, "alice", 1))
                .await
                .map(|_| ())
                .map_err(|e| e.kind())
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => accepted += 1,
            Err(kind) => assert_eq!(kind, ErrorKind::Conflict),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(store.list_votes(&subject).await.unwrap().len(), 1);
    assert_eq!(
        store.get_subject(&subject).await.unwrap().unwrap().vote_tally,
        1
    );
}

async fn check_first_contact(store: Store) {
    let resolver = Arc::new(ChatResolver::new(Arc::clone(&store)));
    let barrier = Arc::new(Barrier::new(10));

    let mut handles = Vec::new();
    for i in 0..10 {
        let resolver = Arc::clone(&resolver);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            if i % 2 == 0 {
                resolver.resolve("alice", "bob").await
            } else {
                resolver.resolve("bob", "alice").await
            }
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);

    let stored = store.find_conversation(&pair("alice", "bob")).await.unwrap();
    assert_eq!(stored.map(|c| c.id), ids.pop());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_distinct_voters_sum_linearly() {
    check_distinct_voters(memory()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_distinct_voters_sum_linearly() {
    let db = TempDb::create();
    check_distinct_voters(sqlite(&db)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_same_voter_keeps_one_record() {
    check_same_voter(memory()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_same_voter_keeps_one_record() {
    let db = TempDb::create();
    check_same_voter(sqlite(&db)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_first_contact_creates_one_conversation() {
    check_first_contact(memory()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_first_contact_creates_one_conversation() {
    let db = TempDb::create();
    check_first_contact(sqlite(&db)).await;
}

/// Two resolvers over separate pools share no in-process lock; the unique
/// pair constraint alone decides the winner.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_first_contact_across_stores() {
    let db = TempDb::create();
    let left = Arc::new(ChatResolver::new(sqlite(&db)));
    let right = Arc::new(ChatResolver::new(sqlite_reopened(&db)));
    let barrier = Arc::new(Barrier::new(2));

    let a = {
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            left.resolve("alice", "bob").await
        })
    };
    let b = {
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            right.resolve("bob", "alice").await
        })
    };

    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(
        db.store()
            .list_conversations(&a.user_a)
            .await
            .unwrap()
            .len(),
        1
    );
}

/// Distinct voters through two ledgers with separate lock tables still
/// produce the sequential tally, because tally updates are relative.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_distinct_voters_across_stores() {
    let db = TempDb::create();
    let subject = ask(sqlite(&db)).await;
    let names = voters(10);
    let (left_voters, right_voters) = names.split_at(5);
    let left_script = random_script(left_voters, 5, 11);
    let right_script = random_script(right_voters, 5, 13);

    let left = Arc::new(VoteLedger::new(sqlite(&db)));
    let right = Arc::new(VoteLedger::new(sqlite_reopened(&db)));
    tokio::join!(
        run_script(left, &subject, &left_script),
        run_script(right, &subject, &right_script)
    );

    let store = db.store();
    let tally = store.get_subject(&subject).await.unwrap().unwrap().vote_tally;
    assert_eq!(
        tally,
        expected_tally(&left_script) + expected_tally(&right_script)
    );
}

/// Two ledgers with separate lock tables read alice's up vote before
/// either commits, then both request the same change. Exactly one change
/// applies; the other finds the record moved and is rejected untouched.
async fn check_same_voter_across_stores(requested: i64) {
    let db = TempDb::create();
    let subject = ask(sqlite(&db)).await;
    VoteLedger::new(sqlite(&db))
        .apply(VoteRequest::new(subject.clone(), "alice", 1))
        .await
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let left = ReadInLockstep::ledger(sqlite(&db), &barrier);
    let right = ReadInLockstep::ledger(sqlite_reopened(&db), &barrier);
    let request = VoteRequest::new(subject.clone(), "alice", requested);
    let (a, b) = tokio::join!(
        tokio::spawn({
            let request = request.clone();
            async move { left.apply(request).await }
        }),
        tokio::spawn(async move { right.apply(request).await })
    );

    let results = [a.unwrap(), b.unwrap()];
    let applied = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(applied, 1, "{results:?}");
    let rejected = results.iter().find_map(|r| r.as_ref().err());
    assert!(
        matches!(
            rejected,
            Some(Error::Conflict(ConflictError::StaleVote { .. }))
        ),
        "{rejected:?}"
    );

    let store = db.store();
    let audit = store.audit_tally(&subject).await.unwrap().unwrap();
    assert!(audit.is_consistent(), "{audit:?}");
    assert_eq!(audit.stored, requested);
    let held = store
        .find_vote(&subject, &Username::parse("alice", "voter").unwrap())
        .await
        .unwrap()
        .map(|record| record.vote);
    assert_eq!(held, Vote::from_value(requested));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_same_voter_switch_across_stores() {
    check_same_voter_across_stores(-1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_same_voter_retract_across_stores() {
    check_same_voter_across_stores(0).await;
}

#[test]
fn ledger_store_is_cheap_to_share() {
    let services = memory_services();
    let copy: LedgerStore = services.store.clone();
    assert_eq!(copy.backend(), services.store.backend());
}
