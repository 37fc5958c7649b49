use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_core::pool::{replace_placeholders, StringPool};
use umbra_core::Error;

#[test]
fn test_intern_is_idempotent() {
    let mut pool = StringPool::new();
    assert_eq!(pool.intern("hello"), 0);
    assert_eq!(pool.intern("world"), 1);
    assert_eq!(pool.intern("hello"), 0);
    assert_eq!(pool.len(), 2);
}

#[test]
fn test_identity_layout_without_shuffle_or_rotate() {
    let mut pool = StringPool::new();
    for s in ["a", "b", "c"] {
        pool.intern(s);
    }
    let mut rng = StdRng::seed_from_u64(0);
    let layout = pool.finalize(false, false, &mut rng);

    assert_eq!(layout.rotation, 0);
    assert_eq!(layout.storage, vec!["a", "b", "c"]);
    for i in 0..3 {
        assert_eq!(layout.embedded_index(i).unwrap(), i);
    }
}

#[test]
fn test_placeholder_substitution() {
    let text = format!(
        "f({});g({});",
        StringPool::placeholder(0),
        StringPool::placeholder(12)
    );
    let out = replace_placeholders(&text, |i| Ok(format!("<{i}>"))).unwrap();
    assert_eq!(out, "f(<0>);g(<12>);");
}

#[test]
fn test_unterminated_placeholder_is_an_error() {
    let text = format!("f({}", '\u{F8F0}');
    assert!(matches!(
        replace_placeholders(&text, |i| Ok(i.to_string())),
        Err(Error::Transform(_))
    ));
}

#[test]
fn test_out_of_range_index_is_an_error() {
    let mut pool = StringPool::new();
    pool.intern("only");
    let mut rng = StdRng::seed_from_u64(0);
    let layout = pool.finalize(true, true, &mut rng);
    assert!(layout.embedded_index(5).is_err());
}
