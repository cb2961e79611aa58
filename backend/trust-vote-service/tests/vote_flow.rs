//! End-to-end vote flows over the public ledger API.
use trust_vote_service::{
    CastOutcome, Confirmation, ContentItem, UntrustReason, VoteError, VoteKind, VoteLedger,
    VoteRequest, VoteTally,
};

fn tally(item_id: &str, trust: u64, untrust: u64, vote: Option<VoteKind>) -> VoteTally {
    VoteTally {
        item_id: item_id.to_string(),
        trust_count: trust,
        untrust_count: untrust,
        current_user_vote: vote,
    }
}

#[test]
fn test_trust_retract_untrust_then_conflict() {
    let mut ledger = VoteLedger::with_items("me", vec![ContentItem::new("1", 120, 30)]).unwrap();

    let outcome = ledger
        .cast_vote("1", VoteKind::Trust, Some(Confirmation::Verified))
        .unwrap();
    assert_eq!(outcome, CastOutcome::Applied(tally("1", 121, 30, Some(VoteKind::Trust))));

    let outcome = ledger.cast_vote("1", VoteKind::Trust, None).unwrap();
    assert_eq!(outcome, CastOutcome::Retracted(tally("1", 120, 30, None)));

    let outcome = ledger
        .cast_vote(
            "1",
            VoteKind::Untrust,
            Some(Confirmation::Flagged(UntrustReason::MisleadingInformation)),
        )
        .unwrap();
    assert_eq!(
        outcome,
        CastOutcome::Applied(tally("1", 120, 31, Some(VoteKind::Untrust)))
    );

    let err = ledger
        .cast_vote("1", VoteKind::Trust, Some(Confirmation::Verified))
        .unwrap_err();
    assert_eq!(
        err,
        VoteError::VoteConflict {
            item_id: "1".to_string(),
            active: VoteKind::Untrust,
        }
    );
    assert!(err.is_user_recoverable());
    assert_eq!(
        ledger.tally("1").unwrap(),
        tally("1", 120, 31, Some(VoteKind::Untrust))
    );
}

#[test]
fn test_fresh_item_has_zero_trust_percentage() {
    let ledger = VoteLedger::with_items("me", vec![ContentItem::new("new", 0, 0)]).unwrap();
    assert_eq!(ledger.trust_percentage("new").unwrap(), 0.0);
    assert_eq!(ledger.tally("new").unwrap(), tally("new", 0, 0, None));
}

#[test]
fn test_two_phase_vote_with_dismissal() {
    let mut ledger = VoteLedger::with_items("me", vec![ContentItem::new("3", 95, 15)]).unwrap();

    let pending = match ledger.request_vote("3", VoteKind::Untrust).unwrap() {
        VoteRequest::Pending(p) => p,
        other => panic!("expected a pending vote, got {:?}", other),
    };
    assert_eq!(pending.prompt.reasons, UntrustReason::ALL.to_vec());

    // Dismissing the dialog is a no-op
    assert!(ledger.cancel_vote(pending.token));
    assert_eq!(ledger.tally("3").unwrap(), tally("3", 95, 15, None));

    let pending = match ledger.request_vote("3", VoteKind::Untrust).unwrap() {
        VoteRequest::Pending(p) => p,
        other => panic!("expected a pending vote, got {:?}", other),
    };
    let after = ledger
        .confirm_vote(pending.token, Confirmation::Flagged(UntrustReason::ScamFraud))
        .unwrap();
    assert_eq!(after, tally("3", 95, 16, Some(VoteKind::Untrust)));
    assert_eq!(ledger.history("3").unwrap()[0].reason, Some(UntrustReason::ScamFraud));
}

#[test]
fn test_votes_on_one_item_do_not_touch_others() {
    let mut ledger = VoteLedger::with_items(
        "me",
        vec![ContentItem::new("1", 120, 30), ContentItem::new("2", 30, 85)],
    )
    .unwrap();

    ledger
        .cast_vote("1", VoteKind::Trust, Some(Confirmation::Verified))
        .unwrap();
    ledger
        .cast_vote(
            "2",
            VoteKind::Untrust,
            Some(Confirmation::Flagged(UntrustReason::ManipulatedMedia)),
        )
        .unwrap();

    assert_eq!(ledger.tally("1").unwrap(), tally("1", 121, 30, Some(VoteKind::Trust)));
    assert_eq!(ledger.tally("2").unwrap(), tally("2", 30, 86, Some(VoteKind::Untrust)));
}

#[test]
fn test_retracting_a_seeded_vote() {
    let item = ContentItem::new("4", 150, 20)
        .with_user_vote(VoteKind::Trust)
        .unwrap();
    let mut ledger = VoteLedger::with_items("me", vec![item]).unwrap();

    let outcome = ledger.cast_vote("4", VoteKind::Trust, None).unwrap();
    assert_eq!(outcome, CastOutcome::Retracted(tally("4", 149, 20, None)));
}

#[test]
fn test_max_count_seed_from_json() {
    let seed: Vec<trust_vote_service::seed::SeedItem> =
        serde_json::from_str(r#"[{"id":"x","trust":18446744073709551615,"untrust":1}]"#).unwrap();
    let item = seed
        .into_iter()
        .next()
        .unwrap()
        .into_item(chrono::Utc::now() + chrono::Duration::hours(1))
        .unwrap();
    let mut ledger = VoteLedger::with_items("me", vec![item]).unwrap();
    assert!(ledger.trust_percentage("x").unwrap() > 99.9);

    let err = ledger
        .cast_vote("x", VoteKind::Trust, Some(Confirmation::Verified))
        .unwrap_err();
    assert!(matches!(err, VoteError::CountOverflow { .. }));
    assert_eq!(ledger.tally("x").unwrap(), tally("x", u64::MAX, 1, None));
    assert!(ledger.history("x").unwrap().is_empty());
}
