//! Integration tests for evaluated results: state transport through
//! `map` / `flat_map` / `filter`, iteration, re-evaluation, and sharing
//! case chains across subjects and threads.

use casematch::{Cases, ErrorKind, Match, MatchError, MatchMonad, MatchState, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
#[error("boom")]
struct Boom;

fn matched() -> MatchMonad<i32> {
    Match::of(1).when_is(1).then(1).evaluate()
}

fn otherwise() -> MatchMonad<i32> {
    Match::of(1).when_is(0).then(0).otherwise(1).evaluate()
}

fn unmatched() -> MatchMonad<i32> {
    Match::of(1).when_is(0).then(0).evaluate()
}

fn assert_send_sync<T: Send + Sync>() {}

// ══════════════════════════════════════════════════════════════════════════════
// States
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn states_are_reported() {
    assert_eq!(matched().state(), MatchState::Matched);
    assert_eq!(otherwise().state(), MatchState::Otherwise);
    assert_eq!(unmatched().state(), MatchState::Unmatched);
    assert!(unmatched().is_unmatched());
}

#[test]
fn unmatched_get_is_no_match() {
    let err = unmatched().get().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMatch);
    assert_eq!(err.to_string(), "no match for 1");
}

#[test]
fn empty_chain_is_unmatched() {
    let cases: Cases<bool> = Match::of("x");
    assert!(cases.is_empty());
    assert!(cases.evaluate().is_unmatched());
}

#[test]
fn subject_is_kept_on_the_result() {
    let monad = Match::of("abc").when_is(0).then(0).evaluate();
    assert_eq!(monad.subject(), &Value::from("abc"));
}

#[test]
fn state_serializes_lowercase() {
    let json = serde_json::to_string(&MatchState::Otherwise).unwrap();
    assert_eq!(json, "\"otherwise\"");
    let back: MatchState = serde_json::from_str("\"unmatched\"").unwrap();
    assert_eq!(back, MatchState::Unmatched);
}

// ══════════════════════════════════════════════════════════════════════════════
// map
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn map_transports_matched() {
    let monad = matched().map(|i| i + 1);
    assert_eq!(monad.state(), MatchState::Matched);
    assert_eq!(monad.get().unwrap(), 2);
}

#[test]
fn map_transports_otherwise() {
    let monad = otherwise().map(|i| i.to_string());
    assert_eq!(monad.state(), MatchState::Otherwise);
    assert_eq!(monad.get().unwrap(), "1");
}

#[test]
fn map_never_runs_on_unmatched() {
    let monad = unmatched().map(|_| -> i32 { panic!("mapped an unmatched result") });
    assert!(monad.is_unmatched());
}

#[test]
fn map_keeps_deferred_error() {
    let monad = Match::of(1)
        .when_is(1)
        .then_throw(|| Boom)
        .map(|i: i32| i + 1);
    assert!(monad.is_deferred_error());
    assert_eq!(monad.get().unwrap_err().kind(), ErrorKind::Deferred);
}

// ══════════════════════════════════════════════════════════════════════════════
// flat_map
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn flat_map_forces_inner_cases() {
    let actual = matched().flat_map(|i| Match::of(i).when_is(1).then(2)).get();
    assert_eq!(actual.unwrap(), 2);
}

#[test]
fn flat_map_takes_the_inner_state() {
    let monad = matched().flat_map(|i| Match::of(i).when_is(2).then(2).otherwise(3));
    assert_eq!(monad.state(), MatchState::Otherwise);

    let monad = otherwise().flat_map(|i| Match::of(i).when_is(1).then(i));
    assert_eq!(monad.state(), MatchState::Matched);

    let monad = matched().flat_map(|_| unmatched());
    assert!(monad.is_unmatched());
}

#[test]
fn flat_map_never_runs_on_unmatched() {
    let monad: MatchMonad<i32> = unmatched().flat_map(|_| -> MatchMonad<i32> {
        panic!("flat-mapped an unmatched result")
    });
    assert!(monad.is_unmatched());
}

#[test]
fn flat_map_keeps_deferred_error() {
    let monad: MatchMonad<i32> = Match::of(1)
        .when_is(1)
        .then_throw(|| Boom)
        .flat_map(|i: i32| -> MatchMonad<i32> { panic!("flat-mapped {i}") });
    assert!(monad.get().unwrap_err().downcast_deferred::<Boom>().is_some());
}

// ══════════════════════════════════════════════════════════════════════════════
// filter
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn filter_keeps_satisfying_payload() {
    let monad = matched().filter(|i| *i == 1);
    assert!(monad.is_matched());
    assert_eq!(monad.get().unwrap(), 1);

    assert!(otherwise().filter(|i| *i == 1).is_otherwise());
}

#[test]
fn filter_demotes_to_unmatched() {
    let monad = matched().filter(|i| *i == 2);
    assert!(monad.is_unmatched());
    assert_eq!(monad.or_else(9).unwrap(), 9);

    assert!(otherwise().filter(|_| false).is_unmatched());
}

#[test]
fn filter_never_runs_on_unmatched() {
    let monad = unmatched().filter(|_| panic!("filtered an unmatched result"));
    assert!(monad.is_unmatched());
}

#[test]
fn filter_on_cases_forces_them() {
    let monad = Match::of(4).when_type::<i32>().then_map(|i| i * 2).filter(|i| *i > 5);
    assert_eq!(monad.get().unwrap(), 8);
}

// ══════════════════════════════════════════════════════════════════════════════
// iter
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn iter_yields_matched_payload_once() {
    let monad = matched();
    let mut it = monad.iter().unwrap();
    assert_eq!(it.next(), Some(&1));
    assert_eq!(it.next(), None);
}

#[test]
fn iter_yields_otherwise_payload() {
    let monad = otherwise();
    assert_eq!(monad.iter().unwrap().copied().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn iter_is_empty_when_unmatched() {
    let monad = unmatched();
    assert_eq!(monad.iter().unwrap().count(), 0);
}

#[test]
fn iter_restarts_on_each_call() {
    let monad = matched();
    assert_eq!(monad.iter().unwrap().count(), 1);
    assert_eq!(monad.iter().unwrap().count(), 1);
}

#[test]
fn iter_raises_deferred_error() {
    let monad = Match::returning::<i32>(1).when_is(1).then_throw(|| Boom).evaluate();
    assert!(matches!(monad.iter(), Err(MatchError::Deferred(_))));
}

// ══════════════════════════════════════════════════════════════════════════════
// Monad-level otherwise
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn monad_otherwise_only_fills_unmatched() {
    assert_eq!(matched().otherwise(5).get().unwrap(), 1);

    let monad = unmatched().otherwise(5);
    assert_eq!(monad.state(), MatchState::Otherwise);
    assert_eq!(monad.get().unwrap(), 5);
}

#[test]
fn monad_otherwise_skipped_after_filter_demotes_a_match() {
    let monad = matched().filter(|i| *i > 1).otherwise_get(|| -1);
    assert_eq!(monad.state(), MatchState::Unmatched);
    assert_eq!(monad.get().unwrap_err().kind(), ErrorKind::NoMatch);
}

#[test]
fn monad_otherwise_runnable_never_runs_after_a_match() {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let monad = Match::of(1)
        .when_is(1)
        .then(1)
        .filter(|_| false)
        .otherwise_run(move || flag.store(true, Ordering::SeqCst));
    assert_eq!(monad.state(), MatchState::Unmatched);
    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn monad_otherwise_skipped_after_filter_demotes_otherwise() {
    let monad = otherwise().filter(|_| false).otherwise(7);
    assert!(monad.is_unmatched());
    assert_eq!(monad.or_else(0).unwrap(), 0);
}

#[test]
fn monad_otherwise_skipped_after_flat_map_to_unmatched() {
    let monad = matched().flat_map(|_| unmatched()).otherwise(7);
    assert!(monad.is_unmatched());
}

#[test]
fn monad_otherwise_map_sees_subject() {
    let actual = unmatched()
        .otherwise_map(|subject| subject.to_string().len() as i32)
        .get();
    assert_eq!(actual.unwrap(), 1);
}

#[test]
fn monad_otherwise_does_not_mask_failed_chain() {
    let monad = Match::of(1).when_is_in_opt(None).then(1).evaluate().otherwise(2);
    assert_eq!(monad.get().unwrap_err().kind(), ErrorKind::NullArgument);
}

#[test]
fn monad_otherwise_throw() {
    let err = unmatched().otherwise_throw(|| Boom).get().unwrap_err();
    assert!(err.downcast_deferred::<Boom>().is_some());
}

// ══════════════════════════════════════════════════════════════════════════════
// Re-evaluation and reuse
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn each_evaluation_reruns_the_action() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let cases = Match::of(1).when_is(1).then_get(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    cases.get().unwrap();
    cases.get().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[test]
fn registration_leaves_receiver_untouched() {
    let base = Match::of(1).when_is(0).then("zero");
    let extended = base.when_is(1).then("one");

    assert_eq!(base.len(), 1);
    assert_eq!(extended.len(), 2);
    assert_eq!(base.or_else("none").unwrap(), "none");
    assert_eq!(extended.get().unwrap(), "one");
}

#[test]
fn branches_share_a_prefix() {
    let base = Match::of(2).when_is(1).then("one");
    let left = base.when_is(2).then("left");
    let right = base.when_is(2).then("right");
    assert_eq!(left.get().unwrap(), "left");
    assert_eq!(right.get().unwrap(), "right");
}

#[test]
fn rebind_reuses_cases_for_another_subject() {
    let template = Match::returning::<&str>(Value::Nil)
        .when_is(Value::Nil)
        .then("nil")
        .when_type::<i32>()
        .then("int")
        .otherwise("other");

    assert_eq!(template.get().unwrap(), "nil");
    assert_eq!(template.rebind(3).get().unwrap(), "int");
    assert_eq!(template.rebind("x").get().unwrap(), "other");
    assert!(template.rebind(0).has_otherwise());
}

// ══════════════════════════════════════════════════════════════════════════════
// Threads
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn cases_and_results_are_send_sync() {
    assert_send_sync::<Cases<i32>>();
    assert_send_sync::<MatchMonad<String>>();
    assert_send_sync::<MatchError>();
}

#[test]
fn shared_template_evaluates_on_many_threads() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let template = Match::returning::<i64>(Value::Nil)
        .when(|i: i32| i % 2 == 0)
        .then_map(move |i| {
            counter.fetch_add(1, Ordering::SeqCst);
            i64::from(i) * 10
        })
        .otherwise(-1);

    let results: Vec<i64> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let template = &template;
                scope.spawn(move || template.rebind(n).get().unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, vec![0, -1, 20, -1, 40, -1, 60, -1]);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}
