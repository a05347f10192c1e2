mod common;

use futures::future::join_all;
use leftorium::connectors::cms::MockOperation;
use leftorium::models::{RatingStats, Score};
use leftorium::services::{RatingAggregator, VoteError, VoteKind};

fn score(v: u8) -> Score {
    Score::try_from(v).unwrap()
}

/// avg=4.0 over 2 votes, a new 5 gives 4.333/3, changing it to 1 gives 3.0/3.
#[tokio::test]
async fn test_new_vote_then_change() {
    let mock = common::seeded();
    let product = common::product_with_stats(&mock, "10", RatingStats::new(4.0, 2));
    let ned = common::sign_in(&mock, "ned").await;
    let aggregator = RatingAggregator::new(mock.clone());

    let first = aggregator.cast_vote(&ned, &product, score(5)).await.unwrap();
    assert_eq!(first.kind, VoteKind::New);
    assert_eq!(first.stats.count, 3);
    common::assert_close(first.stats.avg, 13.0 / 3.0);
    assert!(first.stats_persisted);
    assert_eq!(format!("{}", first.stats), "4.3 (3 votes)");

    let changed = aggregator.cast_vote(&ned, &product, score(1)).await.unwrap();
    assert_eq!(changed.kind, VoteKind::Changed);
    assert_eq!(changed.rating.id, first.rating.id);
    assert_eq!(changed.stats.count, 3);
    common::assert_close(changed.stats.avg, 3.0);

    let stored = mock.product("10").unwrap().rating;
    assert_eq!(stored, changed.stats);
    assert_eq!(mock.ratings_for("10").len(), 1);
    assert_eq!(
        aggregator.user_vote(&ned, "10").await.unwrap().map(|r| r.score),
        Some(score(1))
    );
}

/// Casting the same score twice leaves the aggregate exactly as it was.
#[tokio::test]
async fn test_repeated_vote_is_idempotent() {
    let mock = common::seeded();
    let product = common::product_with_stats(&mock, "11", RatingStats::new(3.7, 10));
    let ned = common::sign_in(&mock, "ned").await;
    let aggregator = RatingAggregator::new(mock.clone());

    let once = aggregator.cast_vote(&ned, &product, score(4)).await.unwrap();
    let twice = aggregator.cast_vote(&ned, &product, score(4)).await.unwrap();
    assert_eq!(once.stats, twice.stats);
    assert_eq!(twice.kind, VoteKind::Changed);
}

/// N distinct voters on a fresh product: avg is the mean, count is N.
#[tokio::test]
async fn test_distinct_voters_average_to_mean() {
    let mock = common::seeded();
    let product = common::product_with_stats(&mock, "12", RatingStats::default());
    let aggregator = RatingAggregator::new(mock.clone());
    let scores = [5u8, 3, 4, 1, 2, 5, 5];

    for (i, s) in scores.iter().enumerate() {
        let voter = common::new_voter(&mock, &format!("voter{i}")).await;
        aggregator.cast_vote(&voter, &product, score(*s)).await.unwrap();
    }

    let stats = aggregator.stats("12").await.unwrap();
    let mean = scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64;
    assert_eq!(stats.count, scores.len() as u32);
    common::assert_close(stats.avg, mean);
    assert_eq!(mock.product("12").unwrap().rating, stats);
}

/// Concurrent voters on one product never lose an update.
#[tokio::test]
async fn test_concurrent_votes_are_serialized() {
    let mock = common::seeded();
    let product = common::product_with_stats(&mock, "13", RatingStats::default());
    let aggregator = RatingAggregator::new(mock.clone());

    let mut voters = Vec::new();
    for i in 0..6 {
        voters.push(common::new_voter(&mock, &format!("racer{i}")).await);
    }
    let scores = [1u8, 2, 3, 4, 5, 5];

    let results = join_all(
        voters
            .iter()
            .zip(scores.iter())
            .map(|(voter, s)| aggregator.cast_vote(voter, &product, score(*s))),
    )
    .await;
    assert!(results.iter().all(|r| r.is_ok()));

    let stats = mock.product("13").unwrap().rating;
    assert_eq!(stats.count, 6);
    common::assert_close(stats.avg, 20.0 / 6.0);
    assert_eq!(aggregator.stats("13").await, Some(stats));
}

/// A failed rating write aborts before the aggregate is touched.
#[tokio::test]
async fn test_failed_vote_write_leaves_stats() {
    let mock = common::seeded();
    let initial = RatingStats::new(4.0, 2);
    let product = common::product_with_stats(&mock, "14", initial);
    let ned = common::sign_in(&mock, "ned").await;
    let aggregator = RatingAggregator::new(mock.clone());
    mock.fail(MockOperation::CreateRating);

    let err = aggregator
        .cast_vote(&ned, &product, score(5))
        .await
        .unwrap_err();
    assert!(matches!(err, VoteError::Connector(_)));
    assert_eq!(aggregator.stats("14").await, Some(initial));
    assert_eq!(mock.product("14").unwrap().rating, initial);
    assert_eq!(mock.calls(MockOperation::UpdateProductStats), 0);
}

/// A failed aggregate push does not fail the vote.
#[tokio::test]
async fn test_failed_stats_push_still_records_vote() {
    let mock = common::seeded();
    let initial = RatingStats::new(4.0, 2);
    let product = common::product_with_stats(&mock, "15", initial);
    let ned = common::sign_in(&mock, "ned").await;
    let aggregator = RatingAggregator::new(mock.clone());
    mock.fail(MockOperation::UpdateProductStats);

    let outcome = aggregator.cast_vote(&ned, &product, score(5)).await.unwrap();
    assert!(!outcome.stats_persisted);
    assert_eq!(outcome.stats.count, 3);
    assert_eq!(mock.ratings_for("15").len(), 1);
    assert_eq!(mock.product("15").unwrap().rating, initial);
    assert_eq!(aggregator.stats("15").await, Some(outcome.stats));
}

/// Without a linked profile nothing is written.
#[tokio::test]
async fn test_vote_without_profile_is_rejected() {
    let mock = common::seeded();
    let product = common::product_with_stats(&mock, "16", RatingStats::default());
    mock.insert_account("todd", "todd@leftorium.test", "secret1");
    let todd = common::sign_in(&mock, "todd").await;
    let aggregator = RatingAggregator::new(mock.clone());

    let err = aggregator
        .cast_vote(&todd, &product, score(3))
        .await
        .unwrap_err();
    assert_eq!(err, VoteError::ProfileMissing);
    assert_eq!(mock.calls(MockOperation::FindRating), 0);
}
