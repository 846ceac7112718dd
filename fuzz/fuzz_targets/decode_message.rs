#![no_main]

use codec::{decode_message, CodecLimits, EntityManager, Field, Schema, SchemaBuilder};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Default, Clone, PartialEq)]
struct Leaf {
    label: String,
    weight: Option<f32>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Node {
    id: u16,
    name: Option<String>,
    values: Vec<i32>,
    leaf: Option<Leaf>,
    leaves: Vec<Leaf>,
}

fn leaf_schema() -> SchemaBuilder<Leaf> {
    Schema::builder()
        .field(Field::scalar("Label", |l: &Leaf| &l.label, |l: &mut Leaf| &mut l.label))
        .field(Field::scalar("Weight", |l: &Leaf| &l.weight, |l: &mut Leaf| &mut l.weight))
}

fn node_schema() -> Schema<Node> {
    Schema::builder()
        .field(Field::scalar("Id", |n: &Node| &n.id, |n: &mut Node| &mut n.id).key())
        .field(Field::scalar("Name", |n: &Node| &n.name, |n: &mut Node| &mut n.name))
        .field(Field::list("Values", |n: &Node| &n.values, |n: &mut Node| &mut n.values))
        .field(Field::optional_object(
            "Leaf",
            leaf_schema(),
            |n: &Node| &n.leaf,
            |n: &mut Node| &mut n.leaf,
        ))
        .field(Field::object_list(
            "Leaves",
            leaf_schema(),
            |n: &Node| &n.leaves,
            |n: &mut Node| &mut n.leaves,
        ))
        .limits(CodecLimits::for_testing())
        .build()
        .expect("fuzz schema")
}

fuzz_target!(|data: &[u8]| {
    let schema = node_schema();
    let mut target = Node::default();
    if decode_message(&schema, data, &mut target).is_err() {
        return;
    }

    // Anything that decodes must re-encode, and a snapshot of it must decode
    // back to the same entity.
    let mut manager = EntityManager::new(schema.clone(), 0).expect("keyed schema");
    let Ok(snapshot) = manager.snapshot(&target, true) else {
        return;
    };
    let mut mirror = Node::default();
    decode_message(&schema, &snapshot, &mut mirror).expect("own snapshot decodes");
    assert!(schema.get_equals(&mirror, &target));
    assert!(manager.difference(&target, false).expect("tracked").is_empty());
});
