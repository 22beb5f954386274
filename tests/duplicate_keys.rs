#![cfg(feature = "std")]

use rstest::rstest;

use fixed_json::{Context, DuplicateKeys, NodeKind, ParseOptions, Slot};

fn options(policy: DuplicateKeys) -> ParseOptions {
    ParseOptions::new().with_duplicate_keys(policy)
}

fn keys(ctx: &Context<'_, '_, u16>) -> Vec<String> {
    let root = ctx.root().unwrap();
    ctx.children(root)
        .map(|key| ctx.text_str(key).unwrap().to_string())
        .collect()
}

#[rstest]
fn overwrite_keeps_single_key_with_last_value() {
    let mut slots = [Slot::<u16>::VACANT; 16];
    let mut ctx = Context::new(&mut slots)
        .unwrap()
        .with_options(options(DuplicateKeys::OverwriteLast));
    ctx.parse_str(r#"{"a":1,"a":2}"#).unwrap();

    assert_eq!(keys(&ctx), vec!["a"]);
    let root = ctx.root().unwrap();
    let value = ctx.get_member(root, b"a").unwrap();
    assert_eq!(ctx.text_str(value), Some("2"));
    assert_eq!(ctx.node_count(), 3);
    assert_eq!(ctx.to_vec().unwrap(), br#"{"a":2}"#);
}

#[rstest]
fn keep_all_preserves_both_in_order() {
    let mut slots = [Slot::<u16>::VACANT; 16];
    let mut ctx = Context::new(&mut slots)
        .unwrap()
        .with_options(options(DuplicateKeys::KeepAll));
    ctx.parse_str(r#"{"a":1,"a":2}"#).unwrap();

    assert_eq!(keys(&ctx), vec!["a", "a"]);
    let root = ctx.root().unwrap();
    let first = ctx.get_member(root, b"a").unwrap();
    assert_eq!(ctx.text_str(first), Some("1"));
    assert_eq!(ctx.to_vec().unwrap(), br#"{"a":1,"a":2}"#);
}

#[rstest]
fn overwrite_finds_keys_past_the_first() {
    let mut slots = [Slot::<u16>::VACANT; 32];
    let mut ctx = Context::new(&mut slots)
        .unwrap()
        .with_options(options(DuplicateKeys::OverwriteLast));
    ctx.parse_str(r#"{"x":0,"y":0,"z":[1,2,3],"z":"new","y":{"k":true}}"#)
        .unwrap();

    assert_eq!(keys(&ctx), vec!["x", "y", "z"]);
    assert_eq!(
        ctx.to_vec().unwrap(),
        br#"{"x":0,"y":{"k":true},"z":"new"}"#
    );
}

#[rstest]
fn overwrite_returns_whole_subtree_to_free_list() {
    let mut slots = [Slot::<u16>::VACANT; 32];
    let mut ctx = Context::new(&mut slots)
        .unwrap()
        .with_options(options(DuplicateKeys::OverwriteLast));
    // first value of "a" is 6 nodes: object, key, array, 3 numbers
    ctx.parse_str(r#"{"a":{"b":[1,2,3]},"c":0,"a":9}"#).unwrap();

    // object, key a, 9, key c, 0
    assert_eq!(ctx.node_count(), 5);
    let root = ctx.root().unwrap();
    let c = ctx.get_member(root, b"c").unwrap();
    assert_eq!(ctx.text_str(c), Some("0"));
    assert_eq!(ctx.to_vec().unwrap(), br#"{"a":9,"c":0}"#);
}

#[rstest]
fn overwrite_reuses_freed_slots() {
    // Too small for both values at once, enough once the first is freed.
    let mut slots = [Slot::<u16>::VACANT; 7];
    let mut ctx = Context::new(&mut slots)
        .unwrap()
        .with_options(options(DuplicateKeys::OverwriteLast));
    ctx.parse_str(r#"{"a":[1,2,3],"a":[4,5,6]}"#).unwrap();
    assert_eq!(ctx.to_vec().unwrap(), br#"{"a":[4,5,6]}"#);

    let mut slots = [Slot::<u16>::VACANT; 7];
    let mut ctx = Context::new(&mut slots).unwrap();
    assert!(ctx.parse_str(r#"{"a":[1,2,3],"a":[4,5,6]}"#).is_err());
}

#[rstest]
fn duplicates_are_scoped_to_their_object() {
    let mut slots = [Slot::<u16>::VACANT; 32];
    let mut ctx = Context::new(&mut slots)
        .unwrap()
        .with_options(options(DuplicateKeys::OverwriteLast));
    ctx.parse_str(r#"{"a":{"a":1},"b":[{"a":2},{"a":3}]}"#).unwrap();
    assert_eq!(
        ctx.to_vec().unwrap(),
        br#"{"a":{"a":1},"b":[{"a":2},{"a":3}]}"#
    );
    let root = ctx.root().unwrap();
    let inner = ctx.get_member(root, b"a").unwrap();
    assert_eq!(ctx.kind(inner), Some(NodeKind::Object));
}
