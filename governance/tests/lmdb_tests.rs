//! Integration tests running `PollService` on the LMDB backend:
//! config → environment → votes → reopen → readback.

use std::sync::Arc;

use stakepoll_governance::{Collaborators, PollConfig, PollError, PollService, TracingEventSink};
use stakepoll_nullables::{NullAuthority, NullClock, NullStakeOracle, RecordingEventSink};
use stakepoll_store_lmdb::{LmdbEnvironment, LmdbLedgerStore};
use stakepoll_types::{Address, Choice, Direction, PollParams, Timestamp};
use stakepoll_utils::init_logging;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config_for(dir: &tempfile::TempDir) -> PollConfig {
    let toml = format!(
        r#"
        max_resync_batch = 2

        [storage]
        data_dir = "{}"
        map_size = 16777216

        [logging]
        level = "debug"
        "#,
        dir.path().join("ledger").display()
    );
    PollConfig::from_toml_str(&toml).expect("valid config")
}

fn open_env(config: &PollConfig) -> LmdbEnvironment {
    LmdbEnvironment::open(
        &config.storage.data_dir,
        config.storage.max_dbs,
        config.storage.map_size,
    )
    .expect("open env")
}

fn service(
    env: &LmdbEnvironment,
    config: PollConfig,
    oracle: Arc<NullStakeOracle>,
) -> PollService<LmdbLedgerStore> {
    let collaborators = Collaborators {
        oracle,
        authority: Arc::new(NullAuthority::allow_all()),
        clock: Arc::new(NullClock::new(5)),
        events: Arc::new(RecordingEventSink::new()),
    };
    PollService::new(env.ledger_store(), collaborators, config).expect("service")
}

fn params() -> PollParams {
    PollParams {
        title: "Treasury grant".into(),
        summary: String::new(),
        url: String::new(),
        creator: Address::new(vec![0xC0, 0xFF, 0xEE]),
        start_time: Timestamp::new(0),
        end_time: Timestamp::new(100),
        tiers: vec![1_000, 100, 10],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn ledger_survives_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config_for(&dir);
    init_logging(config.logging.format, &config.logging.level);
    let oracle = Arc::new(NullStakeOracle::new(50_000));

    let poll_id = {
        let env = open_env(&config);
        let svc = service(&env, config.clone(), oracle.clone());
        let poll_id = svc.create_poll(params()).unwrap();
        for (v, stake) in [(1u8, 5_000u64), (2, 500), (3, 50)] {
            let voter = Address::new(vec![v]);
            oracle.set_balance(&voter, stake);
            svc.vote(poll_id, &voter, Some(Choice::Yes)).unwrap();
        }
        svc.vote(poll_id, &Address::new(vec![2]), Some(Choice::No))
            .unwrap();
        poll_id
    };

    let env = open_env(&config);
    let svc = service(&env, config, oracle);
    let poll = svc.get_poll(poll_id).unwrap();
    assert_eq!((poll.yes_weight, poll.total_weight), (5_050, 5_550));
    assert_eq!(svc.get_tier_id(poll_id, &Address::new(vec![1])).unwrap(), 1);
    assert_eq!(svc.get_tier_id(poll_id, &Address::new(vec![2])).unwrap(), 2);
    assert_eq!(svc.get_tier_id(poll_id, &Address::new(vec![3])).unwrap(), 3);
    assert_eq!(
        svc.get_vote(poll_id, &Address::new(vec![2])).unwrap().choice,
        Choice::No
    );

    // the id sequence continues after reopen
    assert_eq!(svc.create_poll(params()).unwrap(), poll_id + 1);
}

#[test]
fn lmdb_rejected_vote_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config_for(&dir);
    let env = open_env(&config);
    let oracle = Arc::new(NullStakeOracle::new(50_000));
    let svc = service(&env, config, oracle.clone());
    let poll_id = svc.create_poll(params()).unwrap();

    let voter = Address::new(vec![9]);
    oracle.set_balance(&voter, 3);
    assert!(matches!(
        svc.vote(poll_id, &voter, Some(Choice::Yes)),
        Err(PollError::InsufficientStake { minimum: 10, .. })
    ));
    assert!(svc.get_tier_id(poll_id, &voter).is_err());
    for tier in 1..=3 {
        assert!(svc
            .get_votes(poll_id, tier, None, 10, Direction::Ascending)
            .unwrap()
            .is_empty());
    }
}

#[test]
fn lmdb_resync_with_cursor() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config_for(&dir);
    let env = open_env(&config);
    let oracle = Arc::new(NullStakeOracle::new(50_000));
    let svc = service(&env, config, oracle.clone());
    let poll_id = svc.create_poll(params()).unwrap();

    for v in 1..=5u8 {
        let voter = Address::new(vec![0x10, v]);
        oracle.set_balance(&voter, 20);
        svc.vote(poll_id, &voter, Some(Choice::Yes)).unwrap();
    }
    // everyone grows into tier 2
    for v in 1..=5u8 {
        oracle.set_balance(&Address::new(vec![0x10, v]), 200);
    }

    let mut cursor: Option<Address> = None;
    let mut calls = 0;
    loop {
        let report = svc.update_votes(poll_id, 3, cursor.as_ref()).unwrap();
        calls += 1;
        if report.is_complete() {
            break;
        }
        cursor = report.next_cursor;
    }
    assert_eq!(calls, 3);

    let poll = svc.get_poll(poll_id).unwrap();
    assert_eq!(poll.total_weight, 1_000);
    let tier2 = svc
        .get_votes(poll_id, 2, None, 0, Direction::Descending)
        .unwrap();
    assert_eq!(tier2.len(), 5);
    assert_eq!(tier2[0].voter, Address::new(vec![0x10, 5]));
}

#[test]
fn tracing_sink_accepts_every_event() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = config_for(&dir);
    let env = open_env(&config);
    let oracle = Arc::new(NullStakeOracle::new(1));
    let collaborators = Collaborators {
        oracle: oracle.clone(),
        authority: Arc::new(NullAuthority::allow_all()),
        clock: Arc::new(NullClock::new(5)),
        events: Arc::new(TracingEventSink),
    };
    let svc = PollService::new(env.ledger_store(), collaborators, config).unwrap();
    let poll_id = svc.create_poll(params()).unwrap();
    let voter = Address::new(vec![1]);
    oracle.set_balance(&voter, 10);
    svc.vote(poll_id, &voter, Some(Choice::No)).unwrap();
    svc.update_votes(poll_id, 3, None).unwrap();
}
