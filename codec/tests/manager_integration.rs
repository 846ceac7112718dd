use chrono::{DateTime, TimeDelta, Utc};
use codec::{decode_message, CodecError, EntityKey, EntityManager, Field, Schema, Value};

#[derive(Debug, Default, Clone, PartialEq)]
struct Ticker {
    exchange: String,
    symbol: String,
    last: f64,
    volume: u64,
    halted: bool,
}

fn ticker_schema() -> Schema<Ticker> {
    Schema::builder()
        .field(Field::scalar("Last", |t: &Ticker| &t.last, |t: &mut Ticker| &mut t.last))
        .field(
            Field::scalar("Exchange", |t: &Ticker| &t.exchange, |t: &mut Ticker| &mut t.exchange)
                .key(),
        )
        .field(
            Field::scalar("Symbol", |t: &Ticker| &t.symbol, |t: &mut Ticker| &mut t.symbol).key(),
        )
        .field(Field::scalar("Volume", |t: &Ticker| &t.volume, |t: &mut Ticker| &mut t.volume))
        .field(Field::scalar("Halted", |t: &Ticker| &t.halted, |t: &mut Ticker| &mut t.halted))
        .build()
        .unwrap()
}

fn ticker(exchange: &str, symbol: &str, last: f64) -> Ticker {
    Ticker {
        exchange: exchange.into(),
        symbol: symbol.into(),
        last,
        volume: 0,
        halted: false,
    }
}

#[test]
fn difference_requires_tracked_state() {
    let mut manager = EntityManager::new(ticker_schema(), 1).unwrap();
    let err = manager.difference(&ticker("XNAS", "MSFT", 1.0), true).unwrap_err();
    assert_eq!(
        err,
        CodecError::EntityNotFound {
            key: EntityKey::new(vec![
                Some(Value::String("XNAS".into())),
                Some(Value::String("MSFT".into())),
            ]),
        }
    );
}

#[test]
fn receiver_follows_snapshot_then_differences() {
    let mut manager = EntityManager::new(ticker_schema(), 4).unwrap();
    let schema = manager.schema().clone();

    let mut sent = ticker("XNAS", "MSFT", 410.25);
    let snapshot = manager.snapshot(&sent, true).unwrap();
    assert_eq!(snapshot[0], 0x84);

    let mut mirror = Ticker::default();
    decode_message(&schema, &snapshot, &mut mirror).unwrap();
    assert_eq!(mirror, sent);

    for tick in 1..=4_u32 {
        sent.last += 0.25;
        sent.volume += u64::from(tick) * 100;
        let delta = manager.difference(&sent, true).unwrap();
        assert_eq!(delta[0], 0x04);
        assert!(delta.len() < snapshot.len());
        decode_message(&schema, &delta, &mut mirror).unwrap();
        assert_eq!(mirror, sent);
    }
}

#[test]
fn difference_without_checkpoint_keeps_baseline() {
    let mut manager = EntityManager::new(ticker_schema(), 0).unwrap();
    let base = ticker("XNYS", "IBM", 180.0);
    manager.snapshot(&base, true).unwrap();

    let mut first = base.clone();
    first.halted = true;
    let delta_first = manager.difference(&first, false).unwrap();

    let mut second = base.clone();
    second.last = 181.0;
    let delta_second = manager.difference(&second, false).unwrap();

    // Both deltas are relative to the checkpointed base.
    let schema = manager.schema().clone();
    let mut from_base = base.clone();
    decode_message(&schema, &delta_second, &mut from_base).unwrap();
    assert_eq!(from_base, second);
    assert!(!delta_first.is_empty());

    // Reverting to the baseline produces no bytes.
    assert!(manager.difference(&base, false).unwrap().is_empty());
}

#[test]
fn keys_are_tracked_independently() {
    let mut manager = EntityManager::new(ticker_schema(), 2).unwrap();
    let msft = ticker("XNAS", "MSFT", 1.0);
    let aapl = ticker("XNAS", "AAPL", 2.0);
    manager.snapshot(&msft, true).unwrap();
    manager.snapshot(&aapl, true).unwrap();
    manager.snapshot(&ticker("XNAS", "GOOG", 3.0), false).unwrap();
    assert_eq!(manager.len(), 2);
    assert!(manager.contains(&msft));
    assert!(!manager.contains(&ticker("XNAS", "GOOG", 3.0)));

    let mut moved = aapl.clone();
    moved.last = 2.5;
    assert!(manager.difference(&msft, true).unwrap().is_empty());
    assert!(!manager.difference(&moved, true).unwrap().is_empty());

    assert!(manager.remove(&msft));
    assert!(!manager.remove(&msft));
    assert!(matches!(
        manager.difference(&msft, true),
        Err(CodecError::EntityNotFound { .. })
    ));

    manager.clear();
    assert!(manager.is_empty());
}

#[test]
fn non_key_changes_share_a_key() {
    let mut manager = EntityManager::new(ticker_schema(), 2).unwrap();
    let base = ticker("XLON", "VOD", 70.0);
    manager.snapshot(&base, true).unwrap();

    let mut later = base.clone();
    later.last = 71.0;
    later.halted = true;
    assert!(manager.contains(&later));
    assert_eq!(manager.schema().key_of(&later), manager.schema().key_of(&base));
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Lease {
    holder: String,
    granted: DateTime<Utc>,
    ttl: TimeDelta,
}

fn lease_schema() -> Schema<Lease> {
    Schema::builder()
        .field(
            Field::scalar("Holder", |l: &Lease| &l.holder, |l: &mut Lease| &mut l.holder).key(),
        )
        .field(Field::scalar("Granted", |l: &Lease| &l.granted, |l: &mut Lease| &mut l.granted))
        .field(Field::scalar("Ttl", |l: &Lease| &l.ttl, |l: &mut Lease| &mut l.ttl))
        .build()
        .unwrap()
}

#[test]
fn nanosecond_times_settle_after_snapshot() {
    let mut manager = EntityManager::new(lease_schema(), 6).unwrap();
    let mut lease = Lease {
        holder: "node-a".into(),
        granted: DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap(),
        ttl: TimeDelta::nanoseconds(1_500),
    };
    let snapshot = manager.snapshot(&lease, true).unwrap();
    assert!(manager.difference(&lease, true).unwrap().is_empty());
    assert!(manager.difference(&lease, true).unwrap().is_empty());

    let schema = manager.schema().clone();
    let mut mirror = Lease::default();
    decode_message(&schema, &snapshot, &mut mirror).unwrap();
    assert_eq!(mirror, lease);

    lease.ttl = TimeDelta::nanoseconds(1_501);
    let delta = manager.difference(&lease, true).unwrap();
    assert!(!delta.is_empty());
    decode_message(&schema, &delta, &mut mirror).unwrap();
    assert_eq!(mirror, lease);
    assert!(manager.difference(&lease, true).unwrap().is_empty());
}
