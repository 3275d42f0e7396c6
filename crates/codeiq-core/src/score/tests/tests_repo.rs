//! Tests for repository scores and trend

use std::collections::BTreeMap;

use rstest::rstest;

use crate::scanner::FileResult;
use crate::score::{CategoryScore, FileScoreSummary, RepoScoreSnapshot, RepoScores};

fn summary(health: f64, security: f64, knowledge: f64) -> FileScoreSummary {
    let score = |value: f64| CategoryScore {
        score: value,
        scanners: BTreeMap::from([("Scanner".to_string(), FileResult::clean())]),
    };
    FileScoreSummary {
        health: score(health),
        security: score(security),
        knowledge: score(knowledge),
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_category_averages_across_files() {
    let files = BTreeMap::from([
        ("a.py".to_string(), summary(9.0, 10.0, 8.0)),
        ("b.py".to_string(), summary(7.0, 0.0, 10.0)),
    ]);

    let scores = RepoScores::from_files(&files);

    assert_eq!(scores.health, Some(8.0));
    assert_eq!(scores.security, Some(5.0));
    assert_eq!(scores.knowledge, Some(9.0));
    assert!(close(scores.overall().unwrap_or_default(), 22.0 / 3.0));
}

#[test]
fn test_defined_zero_categories_count() {
    let files = BTreeMap::from([("a.py".to_string(), FileScoreSummary::default())]);

    let scores = RepoScores::from_files(&files);

    assert_eq!(scores.security, Some(0.0));
    assert_eq!(scores.overall(), Some(0.0));
}

#[test]
fn test_no_files_means_no_averages() {
    let scores = RepoScores::from_files(&BTreeMap::new());

    assert_eq!(scores, RepoScores::default());
    assert_eq!(scores.overall(), None);
}

#[test]
fn test_overall_ignores_absent_categories() {
    let scores = RepoScores {
        health: Some(6.0),
        security: None,
        knowledge: Some(8.0),
    };
    assert_eq!(scores.overall(), Some(7.0));
}

#[rstest]
#[case(Some((5.0, 5.0, 5.0)), 2.0)]
#[case(None, 7.0)]
#[case(Some((9.0, 6.0, 9.0)), -1.0)]
fn test_trend_against_previous(#[case] previous: Option<(f64, f64, f64)>, #[case] expected: f64) {
    let current = RepoScores {
        health: Some(7.0),
        security: Some(7.0),
        knowledge: Some(7.0),
    };
    let previous = previous.map(|(h, s, k)| RepoScoreSnapshot {
        health_score: Some(h),
        security_score: Some(s),
        knowledge_score: Some(k),
        trend: None,
    });

    let snapshot = RepoScoreSnapshot::new(&current, previous.as_ref());

    assert!(snapshot.trend.is_some_and(|t| close(t, expected)));
    assert_eq!(snapshot.health_score, Some(7.0));
}

#[test]
fn test_previous_unset_category_counts_as_zero() {
    let previous = RepoScoreSnapshot {
        health_score: Some(6.0),
        security_score: None,
        knowledge_score: Some(3.0),
        trend: Some(0.5),
    };

    assert!(close(previous.overall_or_zero(), 3.0));

    let current = RepoScores {
        health: Some(6.0),
        security: Some(6.0),
        knowledge: Some(6.0),
    };
    let snapshot = RepoScoreSnapshot::new(&current, Some(&previous));
    assert!(snapshot.trend.is_some_and(|t| close(t, 3.0)));
}

#[test]
fn test_no_files_leaves_trend_unset() {
    let previous = RepoScoreSnapshot {
        health_score: Some(5.0),
        security_score: Some(5.0),
        knowledge_score: Some(5.0),
        trend: Some(0.0),
    };

    let snapshot = RepoScoreSnapshot::new(&RepoScores::from_files(&BTreeMap::new()), Some(&previous));

    assert_eq!(snapshot.trend, None);
    assert!(close(snapshot.overall_or_zero(), 0.0));
}
