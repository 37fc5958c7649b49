use rand::RngCore;
use umbra_core::seed::Seed;
use umbra_core::Error;

#[test]
fn test_deterministic_rng() {
    let seed = Seed::from_hex("0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef")
        .unwrap();

    let mut rng1 = seed.create_deterministic_rng();
    let mut rng2 = seed.create_deterministic_rng();

    // Should produce identical sequences
    assert_eq!(rng1.next_u32(), rng2.next_u32());
    assert_eq!(rng1.next_u64(), rng2.next_u64());
}

#[test]
fn test_different_seeds_different_rngs() {
    let seed1 =
        Seed::from_hex("0x1111111111111111111111111111111111111111111111111111111111111111")
            .unwrap();
    let seed2 =
        Seed::from_hex("0x2222222222222222222222222222222222222222222222222222222222222222")
            .unwrap();

    let mut rng1 = seed1.create_deterministic_rng();
    let mut rng2 = seed2.create_deterministic_rng();

    assert_ne!(rng1.next_u32(), rng2.next_u32());
}

#[test]
fn test_hex_round_trip() {
    let seed = Seed::generate();
    let hex = seed.to_hex();
    assert!(hex.starts_with("0x"));
    assert_eq!(hex.len(), 66); // 0x + 64 hex chars
    assert_eq!(Seed::from_hex(&hex).unwrap(), seed);
}

#[test]
fn test_invalid_hex_rejected() {
    assert!(matches!(
        Seed::from_hex("0xabcd"),
        Err(Error::InvalidSeedLength(4))
    ));
    let not_hex = "zz".repeat(32);
    assert!(matches!(Seed::from_hex(&not_hex), Err(Error::InvalidSeedHex)));
}
