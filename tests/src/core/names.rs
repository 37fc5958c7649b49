use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_core::names::{IdentCharset, NameAllocator};
use umbra_core::options::IdentifierStyle;
use umbra_core::Error;

const JS_CHARSET: IdentCharset = IdentCharset {
    first: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$",
    rest: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$0123456789",
};

fn allocator(style: IdentifierStyle, length: usize) -> NameAllocator {
    NameAllocator::new(style, length, String::new(), JS_CHARSET)
}

#[test]
fn test_allocated_names_are_unique() {
    let mut alloc = allocator(IdentifierStyle::Hexadecimal, 6);
    let mut rng = StdRng::seed_from_u64(1);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        let name = alloc.allocate(&mut rng).unwrap();
        assert!(name.starts_with("_0x"), "unexpected shape: {name}");
        assert_eq!(name.len(), "_0x".len() + 6);
        assert!(seen.insert(name), "duplicate name handed out");
    }
    assert_eq!(alloc.allocated_count(), 200);
}

#[test]
fn test_reserved_names_never_allocated() {
    // Length-1 confusables have exactly four possible first characters.
    let mut alloc = allocator(IdentifierStyle::Confusables, 1);
    alloc.reserve(["I", "l", "O"]);
    let mut rng = StdRng::seed_from_u64(2);

    assert!(alloc.is_reserved("l"));
    let only_free = alloc.allocate(&mut rng).unwrap();
    assert_eq!(only_free, "o");
    assert!(matches!(
        alloc.allocate(&mut rng),
        Err(Error::NameExhaustion { .. })
    ));
}

#[test]
fn test_exhaustion_on_tiny_namespace() {
    let mut alloc = allocator(IdentifierStyle::Confusables, 1);
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..4 {
        alloc.allocate(&mut rng).unwrap();
    }
    assert!(matches!(
        alloc.allocate(&mut rng),
        Err(Error::NameExhaustion { .. })
    ));
}

#[test]
fn test_mangled_sequence_is_deterministic() {
    let mut alloc = allocator(IdentifierStyle::Mangled, 6);
    let mut rng = StdRng::seed_from_u64(4);

    let names: Vec<String> = (0..28).map(|_| alloc.allocate(&mut rng).unwrap()).collect();
    assert_eq!(names[0], "a");
    assert_eq!(names[1], "b");
    assert_eq!(names[25], "z");
    assert_eq!(names[26], "aa");
    assert_eq!(names[27], "ab");
}

#[test]
fn test_prefix_is_applied() {
    let mut alloc = NameAllocator::new(
        IdentifierStyle::Alphanumeric,
        6,
        "p_".to_string(),
        JS_CHARSET,
    );
    let mut rng = StdRng::seed_from_u64(5);

    let name = alloc.allocate(&mut rng).unwrap();
    assert!(name.starts_with("p_"));
    assert_eq!(name.len(), 2 + 6);
}

#[test]
fn test_greek_names_use_greek_letters() {
    let mut alloc = allocator(IdentifierStyle::Greek, 4);
    let mut rng = StdRng::seed_from_u64(6);

    let name = alloc.allocate(&mut rng).unwrap();
    assert_eq!(name.chars().count(), 4);
    assert!(name.chars().all(|c| ('α'..='ω').contains(&c)));
}
