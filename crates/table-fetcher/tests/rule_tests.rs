//! Integration tests for rule evaluation.
//!
//! The in-memory connection emulates the session temporary table, so these
//! tests cover the full create → load → evaluate → drop sequence, the
//! failure paths and serialization on a shared connection.

mod support;

use std::time::Duration;

use support::MemoryConnection;
use table_fetcher::{share, Dialect, FetchError, RulePhase, RuleRowSet, RuleSession, TableFetcher};

fn jagged() -> RuleRowSet {
    RuleRowSet::new(vec![
        vec!["x".to_string(), "y".to_string()],
        vec!["z".to_string()],
    ])
}

// =============================================================================
// Round Trips
// =============================================================================

#[tokio::test]
async fn test_jagged_rows_round_trip_padded() {
    let conn = MemoryConnection::new(Dialect::MySql);
    let probe = conn.probe();

    let out = TableFetcher::new(Dialect::MySql)
        .evaluate_rule(conn.boxed(), "SELECT c1, c2 FROM temp", &jagged())
        .await
        .unwrap();

    assert_eq!(out.width(), 2);
    assert_eq!(
        out.into_rows(),
        vec![
            vec!["x".to_string(), "y".to_string()],
            vec!["z".to_string(), String::new()],
        ]
    );
    assert!(!probe.has_rule_table());
    assert_eq!(probe.close_count(), 1);
}

#[tokio::test]
async fn test_oracle_rule_uses_private_temporary_table() {
    let conn = MemoryConnection::new(Dialect::Oracle);
    let probe = conn.probe();

    let out = TableFetcher::new(Dialect::Oracle)
        .evaluate_rule(
            conn.boxed(),
            "SELECT c2 FROM ORA$PTT_TEMP WHERE c1 = 'x'",
            &jagged(),
        )
        .await
        .unwrap();

    assert_eq!(out.into_rows(), vec![vec!["y".to_string()]]);
    let calls = probe.calls();
    assert!(calls[0].starts_with("CREATE PRIVATE TEMPORARY TABLE ORA$PTT_TEMP"));
    assert_eq!(calls.last().map(String::as_str), Some("DROP TABLE ORA$PTT_TEMP"));
}

#[tokio::test]
async fn test_quotes_in_cells_survive_loading() {
    let rows = RuleRowSet::new(vec![vec!["O'Brien".to_string()]]);

    let out = TableFetcher::new(Dialect::MySql)
        .evaluate_rule(
            MemoryConnection::new(Dialect::MySql).boxed(),
            "SELECT * FROM temp",
            &rows,
        )
        .await
        .unwrap();

    assert_eq!(out.rows()[0][0], "O'Brien");
}

#[tokio::test]
async fn test_rule_matching_nothing_is_an_empty_success() {
    let out = TableFetcher::new(Dialect::MySql)
        .evaluate_rule(
            MemoryConnection::new(Dialect::MySql).boxed(),
            "SELECT c1 FROM temp WHERE c1 = 'nope'",
            &jagged(),
        )
        .await
        .unwrap();
    assert!(out.is_empty());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_failed_phase_is_reported_and_connection_closed() {
    for (marker, phase) in [
        ("CREATE", RulePhase::Create),
        ("INSERT", RulePhase::Load),
        ("SELECT", RulePhase::Evaluate),
    ] {
        let conn = MemoryConnection::new(Dialect::MySql).fail_on(marker);
        let probe = conn.probe();

        let err = TableFetcher::new(Dialect::MySql)
            .evaluate_rule(conn.boxed(), "SELECT c1 FROM temp", &jagged())
            .await
            .unwrap_err();

        match err {
            FetchError::Evaluation { phase: got, .. } => assert_eq!(got, phase, "{}", marker),
            other => panic!("unexpected error for {}: {:?}", marker, other),
        }
        assert_eq!(probe.close_count(), 1, "{}", marker);
        assert!(!probe.has_rule_table(), "{}", marker);
    }
}

#[tokio::test]
async fn test_legacy_evaluation_returns_none_on_failure() {
    let conn = MemoryConnection::new(Dialect::MySql).fail_on("INSERT");
    let probe = conn.probe();

    let out = TableFetcher::new(Dialect::MySql)
        .evaluate_rule_legacy(conn.boxed(), "SELECT c1 FROM temp", &jagged())
        .await;

    assert!(out.is_none());
    assert!(probe.is_closed());
}

#[tokio::test]
async fn test_empty_input_fails_create() {
    let conn = MemoryConnection::new(Dialect::MySql);
    let probe = conn.probe();

    let err = TableFetcher::new(Dialect::MySql)
        .evaluate_rule(conn.boxed(), "SELECT c1 FROM temp", &RuleRowSet::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::Evaluation {
            phase: RulePhase::Create,
            ..
        }
    ));
    assert!(probe.calls().is_empty());
    assert_eq!(probe.close_count(), 1);
}

// =============================================================================
// Sessions and Shared Connections
// =============================================================================

#[tokio::test]
async fn test_session_phases_can_be_driven_explicitly() {
    let mut conn = MemoryConnection::new(Dialect::MySql);
    let probe = conn.probe();

    let mut session = RuleSession::create(&mut conn, 2).await.unwrap();
    assert_eq!(session.width(), 2);
    session.load(&jagged()).await.unwrap();
    let out = session.evaluate("SELECT c2 FROM temp").await.unwrap();
    session.finish().await;

    assert_eq!(
        out.into_rows(),
        vec![vec!["y".to_string()], vec![String::new()]]
    );
    assert!(!probe.has_rule_table());
    assert!(!probe.is_closed());
}

#[tokio::test]
async fn test_unserialized_sessions_on_one_connection_collide() {
    // Two sessions on one connection without the lock: the second CREATE
    // finds the first table still in place.
    let mut conn = MemoryConnection::new(Dialect::MySql);
    let first = RuleSession::create(&mut conn, 1).await.unwrap();
    drop(first);
    let second = RuleSession::create(&mut conn, 1).await;
    assert!(matches!(
        second,
        Err(FetchError::Evaluation {
            phase: RulePhase::Create,
            ..
        })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_connection_serializes_evaluations() {
    let conn = MemoryConnection::new(Dialect::MySql).with_batch_delay(Duration::from_millis(5));
    let probe = conn.probe();
    let shared = share(conn.boxed());
    let fetcher = TableFetcher::new(Dialect::MySql);

    let mut handles = Vec::new();
    for i in 0..8 {
        let shared = shared.clone();
        let fetcher = fetcher.clone();
        handles.push(tokio::spawn(async move {
            let rows = RuleRowSet::new(vec![
                vec![format!("task{}", i), "a".to_string()],
                vec![format!("task{}", i), "b".to_string()],
            ]);
            let out = fetcher
                .evaluate_rule_shared(&shared, "SELECT c1, c2 FROM temp", &rows)
                .await
                .unwrap();
            (i, out)
        }));
    }

    for handle in handles {
        let (i, out) = handle.await.unwrap();
        let rows = out.into_rows();
        assert_eq!(rows.len(), 2, "task {} saw foreign rows", i);
        assert!(rows.iter().all(|r| r[0] == format!("task{}", i)));
    }

    // Each evaluation ran its stale-table drop, create, two inserts, select
    // and drop back to back.
    let calls = probe.calls();
    assert_eq!(calls.len(), 8 * 6);
    for chunk in calls.chunks(6) {
        assert!(chunk[0].starts_with("DROP"));
        assert!(chunk[1].starts_with("CREATE"));
        assert!(chunk[2].starts_with("INSERT"));
        assert!(chunk[3].starts_with("INSERT"));
        assert!(chunk[4].starts_with("SELECT"));
        assert!(chunk[5].starts_with("DROP"));
    }
    assert!(!probe.is_closed());
}

#[tokio::test]
async fn test_cancelled_shared_evaluation_does_not_poison_connection() {
    let conn = MemoryConnection::new(Dialect::MySql).with_batch_delay(Duration::from_millis(50));
    let probe = conn.probe();
    let shared = share(conn.boxed());
    let fetcher = TableFetcher::new(Dialect::MySql);

    let stale = RuleRowSet::new(vec![vec!["old".to_string()], vec!["old".to_string()]]);
    let cancelled = tokio::time::timeout(
        Duration::from_millis(10),
        fetcher.evaluate_rule_shared(&shared, "SELECT c1 FROM temp", &stale),
    )
    .await;
    assert!(cancelled.is_err());
    assert!(probe.has_rule_table());

    let fresh = RuleRowSet::new(vec![vec!["new".to_string()]]);
    let out = fetcher
        .evaluate_rule_shared(&shared, "SELECT c1 FROM temp", &fresh)
        .await
        .unwrap();

    assert_eq!(out.into_rows(), vec![vec!["new".to_string()]]);
    assert!(!probe.has_rule_table());
    assert!(!probe.is_closed());
}

#[tokio::test]
async fn test_oracle_shared_evaluation_tolerates_missing_table() {
    // ORA$PTT_TEMP has no IF EXISTS drop, so the stale-table drop fails
    // on a clean connection and must not stop the evaluation.
    let conn = MemoryConnection::new(Dialect::Oracle);
    let probe = conn.probe();
    let shared = share(conn.boxed());

    let out = TableFetcher::new(Dialect::Oracle)
        .evaluate_rule_shared(&shared, "SELECT c2 FROM ORA$PTT_TEMP", &jagged())
        .await
        .unwrap();

    assert_eq!(out.len(), 2);
    let calls = probe.calls();
    assert_eq!(calls[0], "DROP TABLE ORA$PTT_TEMP");
    assert!(calls[1].starts_with("CREATE PRIVATE TEMPORARY TABLE"));
    assert!(!probe.has_rule_table());
}
