use bitstream::{BitReader, BufferWriterFactory};
use codec::{
    decode_message, encode_delta, encode_snapshot, CodecError, Field, Schema, SchemaBuilder,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Waypoint {
    label: String,
    x: i32,
    y: i32,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Route {
    id: u32,
    driver: Option<String>,
    speed: f32,
    checkpoints: Vec<u16>,
    origin: Waypoint,
    fallback: Option<Waypoint>,
    stops: Vec<Waypoint>,
}

fn waypoint_schema() -> SchemaBuilder<Waypoint> {
    Schema::builder()
        .field(Field::scalar("Label", |w: &Waypoint| &w.label, |w: &mut Waypoint| &mut w.label))
        .field(Field::scalar("X", |w: &Waypoint| &w.x, |w: &mut Waypoint| &mut w.x))
        .field(Field::scalar("Y", |w: &Waypoint| &w.y, |w: &mut Waypoint| &mut w.y))
}

fn route_schema() -> Schema<Route> {
    Schema::builder()
        .field(Field::scalar("Id", |r: &Route| &r.id, |r: &mut Route| &mut r.id).key())
        .field(Field::scalar("Driver", |r: &Route| &r.driver, |r: &mut Route| &mut r.driver))
        .field(Field::scalar("Speed", |r: &Route| &r.speed, |r: &mut Route| &mut r.speed))
        .field(Field::list(
            "Checkpoints",
            |r: &Route| &r.checkpoints,
            |r: &mut Route| &mut r.checkpoints,
        ))
        .field(Field::object(
            "Origin",
            waypoint_schema(),
            |r: &Route| &r.origin,
            |r: &mut Route| &mut r.origin,
        ))
        .field(Field::optional_object(
            "Fallback",
            waypoint_schema(),
            |r: &Route| &r.fallback,
            |r: &mut Route| &mut r.fallback,
        ))
        .field(Field::object_list(
            "Stops",
            waypoint_schema(),
            |r: &Route| &r.stops,
            |r: &mut Route| &mut r.stops,
        ))
        .build()
        .unwrap()
}

fn waypoint(label: &str, x: i32, y: i32) -> Waypoint {
    Waypoint {
        label: label.into(),
        x,
        y,
    }
}

fn base_route() -> Route {
    Route {
        id: 17,
        driver: Some("Ada".into()),
        speed: 12.5,
        checkpoints: vec![1, 2, 3],
        origin: waypoint("Yard", 0, 0),
        fallback: None,
        stops: vec![waypoint("A", 10, 0), waypoint("B", 10, 10)],
    }
}

/// Applies the delta from `previous` to `current` onto a copy of `previous`.
fn apply(schema: &Schema<Route>, previous: &Route, current: &Route) -> (Route, usize) {
    let bytes = schema.delta_to_bytes(current, previous).unwrap();
    let mut target = previous.clone();
    let mut reader = BitReader::new(&bytes).unwrap();
    schema.deserialize_delta(&mut reader, &mut target).unwrap();
    (target, bytes.len())
}

#[test]
fn unchanged_entity_writes_only_missing_bits() {
    let schema = route_schema();
    let route = base_route();
    let bytes = schema.delta_to_bytes(&route, &route).unwrap();
    // One missing bit per item.
    assert_eq!(bytes, [0b1111_1110]);
}

#[test]
fn scalar_change_is_sparse() {
    let schema = route_schema();
    let previous = base_route();
    let mut current = previous.clone();
    current.speed = 13.0;

    let full = schema.to_bytes(&current).unwrap();
    let (decoded, delta_len) = apply(&schema, &previous, &current);
    assert_eq!(decoded, current);
    assert!(delta_len < full.len());
}

#[test]
fn nullable_scalar_transitions() {
    let schema = route_schema();
    let previous = base_route();
    let mut current = previous.clone();
    current.driver = None;
    let (decoded, _) = apply(&schema, &previous, &current);
    assert_eq!(decoded, current);

    let mut back = current.clone();
    back.driver = Some("Grace".into());
    let (decoded, _) = apply(&schema, &current, &back);
    assert_eq!(decoded, back);
}

#[test]
fn primitive_list_grows_and_shrinks() {
    let schema = route_schema();
    let previous = base_route();

    let mut grown = previous.clone();
    grown.checkpoints = vec![1, 9, 3, 0, 5];
    let (decoded, _) = apply(&schema, &previous, &grown);
    assert_eq!(decoded, grown);

    let mut shrunk = grown.clone();
    shrunk.checkpoints = vec![1];
    let (decoded, _) = apply(&schema, &grown, &shrunk);
    assert_eq!(decoded, shrunk);

    let mut emptied = shrunk.clone();
    emptied.checkpoints.clear();
    let (decoded, _) = apply(&schema, &shrunk, &emptied);
    assert_eq!(decoded, emptied);
}

fn delta_bits(schema: &Schema<Route>, previous: &Route, current: &Route) -> usize {
    let mut factory = BufferWriterFactory::new(256).unwrap();
    let mut writer = factory.make().unwrap();
    schema.serialize_delta(&mut writer, current, previous).unwrap();
    writer.bits_written()
}

#[test]
fn same_length_list_edit_omits_count() {
    let schema = route_schema();
    let previous = base_route();
    let mut current = previous.clone();
    current.checkpoints[1] = 9;

    // Id, then Checkpoints: header 2, count missing 1, elements 1 + 18 + 1,
    // then five missing items.
    assert_eq!(delta_bits(&schema, &previous, &current), 1 + 2 + 1 + 20 + 5);
    let (decoded, _) = apply(&schema, &previous, &current);
    assert_eq!(decoded, current);

    let mut grown = current.clone();
    grown.checkpoints.push(4);
    // Count present: header 2 plus 32 bits, then one new element.
    assert_eq!(
        delta_bits(&schema, &current, &grown),
        1 + 2 + 34 + 3 + 18 + 5
    );
}

#[test]
fn same_length_object_list_edit_omits_count() {
    let schema = route_schema();
    let previous = base_route();
    let mut current = previous.clone();
    current.stops[1].y = 11;

    // Stops: header 2, count missing 1, first element missing 1, second
    // element header 2 with Label and X missing and Y present (34).
    assert_eq!(
        delta_bits(&schema, &previous, &current),
        6 + 2 + 1 + 1 + 2 + 2 + 34
    );
    let (decoded, _) = apply(&schema, &previous, &current);
    assert_eq!(decoded, current);
}

#[test]
fn nested_object_carries_only_changed_members() {
    let schema = route_schema();
    let previous = base_route();
    let mut current = previous.clone();
    current.origin.y = -4;

    let mut label_change = previous.clone();
    label_change.origin.label = "Depot".into();

    let (decoded, small) = apply(&schema, &previous, &current);
    assert_eq!(decoded, current);
    let (decoded, larger) = apply(&schema, &previous, &label_change);
    assert_eq!(decoded, label_change);
    assert!(small <= larger);
}

#[test]
fn optional_object_set_update_and_clear() {
    let schema = route_schema();
    let previous = base_route();

    let mut set = previous.clone();
    set.fallback = Some(waypoint("Alt", 3, 4));
    let (decoded, _) = apply(&schema, &previous, &set);
    assert_eq!(decoded, set);

    let mut updated = set.clone();
    if let Some(fallback) = updated.fallback.as_mut() {
        fallback.x = 30;
    }
    let (decoded, _) = apply(&schema, &set, &updated);
    assert_eq!(decoded, updated);

    let mut cleared = updated.clone();
    cleared.fallback = None;
    let (decoded, _) = apply(&schema, &updated, &cleared);
    assert_eq!(decoded, cleared);
}

#[test]
fn object_list_edits() {
    let schema = route_schema();
    let previous = base_route();

    let mut edited = previous.clone();
    edited.stops[1].y = 11;
    edited.stops.push(waypoint("C", 0, 10));
    edited.stops.push(Waypoint::default());
    let (decoded, _) = apply(&schema, &previous, &edited);
    assert_eq!(decoded, edited);

    let mut truncated = edited.clone();
    truncated.stops.truncate(1);
    let (decoded, _) = apply(&schema, &edited, &truncated);
    assert_eq!(decoded, truncated);
}

#[test]
fn changed_key_rejected_on_encode() {
    let schema = route_schema();
    let previous = base_route();
    let mut current = previous.clone();
    current.id = 18;
    current.speed = 1.0;

    let err = schema.delta_to_bytes(&current, &previous).unwrap_err();
    assert_eq!(err, CodecError::KeyMismatch { field: "Id".into() });
}

#[test]
fn changed_key_rejected_on_decode() {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Reading {
        id: u32,
        value: i16,
    }

    // Same wire order, but the sender does not treat Id as a key.
    let sender = Schema::builder()
        .field(Field::scalar("Id", |r: &Reading| &r.id, |r: &mut Reading| &mut r.id))
        .field(Field::scalar("Value", |r: &Reading| &r.value, |r: &mut Reading| &mut r.value))
        .build()
        .unwrap();
    let receiver = Schema::builder()
        .field(Field::scalar("Id", |r: &Reading| &r.id, |r: &mut Reading| &mut r.id).key())
        .field(Field::scalar("Value", |r: &Reading| &r.value, |r: &mut Reading| &mut r.value))
        .build()
        .unwrap();

    let previous = Reading { id: 1, value: 5 };
    let current = Reading { id: 2, value: 6 };
    let bytes = sender.delta_to_bytes(&current, &previous).unwrap();

    let mut target = previous.clone();
    let mut reader = BitReader::new(&bytes).unwrap();
    let err = receiver.deserialize_delta(&mut reader, &mut target).unwrap_err();
    assert_eq!(err, CodecError::KeyMismatch { field: "Id".into() });
    assert_eq!(target.id, 1);
}

#[test]
fn key_equal_to_target_is_accepted_on_decode() {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Reading {
        id: u32,
        value: i16,
    }

    let sender = Schema::builder()
        .field(Field::scalar("Id", |r: &Reading| &r.id, |r: &mut Reading| &mut r.id))
        .field(Field::scalar("Value", |r: &Reading| &r.value, |r: &mut Reading| &mut r.value))
        .build()
        .unwrap();
    let receiver = Schema::builder()
        .field(Field::scalar("Id", |r: &Reading| &r.id, |r: &mut Reading| &mut r.id).key())
        .field(Field::scalar("Value", |r: &Reading| &r.value, |r: &mut Reading| &mut r.value))
        .build()
        .unwrap();

    let bytes = sender
        .delta_to_bytes(&Reading { id: 4, value: 6 }, &Reading { id: 3, value: 5 })
        .unwrap();
    let mut target = Reading { id: 4, value: 0 };
    let mut reader = BitReader::new(&bytes).unwrap();
    receiver.deserialize_delta(&mut reader, &mut target).unwrap();
    assert_eq!(target, Reading { id: 4, value: 6 });
}

#[test]
fn message_stream_tracks_sender_state() {
    let schema = route_schema();
    let mut factory = BufferWriterFactory::new(512).unwrap();

    let mut sent = base_route();
    let snapshot = encode_snapshot(&schema, 9, &sent, &mut factory).unwrap();
    let mut mirror = Route::default();
    decode_message(&schema, &snapshot, &mut mirror).unwrap();
    assert_eq!(mirror, sent);

    for step in 1..=5_i32 {
        let mut next = sent.clone();
        next.speed += 0.5;
        next.origin.x = step;
        if step % 2 == 0 {
            next.stops.push(waypoint("S", step, -step));
        }
        if step == 3 {
            next.fallback = Some(waypoint("F", 1, 1));
        }
        let delta = encode_delta(&schema, 9, &next, &sent, &mut factory).unwrap();
        let header = decode_message(&schema, &delta, &mut mirror).unwrap();
        assert!(!header.snapshot);
        assert_eq!(header.entity_id, 9);
        assert_eq!(mirror, next);
        sent = next;
    }
}
