use capsule_puzzle::{
    CancellationToken, PrimeGenerator, PuzzleConfig, PuzzleEngine, PuzzleSolver,
    locked_value_by_squaring, locked_value_via_totient,
};
use capsule_types::Capsule;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rug::Integer;

fn test_config() -> PuzzleConfig {
    PuzzleConfig {
        // 120 squarings per minute keeps test solves instant
        squarings_per_second: 2,
        prime_bits: 256,
        ..Default::default()
    }
}

fn engine(rng_seed: u64) -> PuzzleEngine<ChaCha8Rng> {
    PuzzleEngine::with_seed_source(test_config(), ChaCha8Rng::seed_from_u64(rng_seed))
}

/// Integration test: seal a message, grind the squarings, get it back
#[test]
fn test_create_then_solve_round_trip() {
    let mut engine = engine(42);
    let capsule = engine.create(b"attack at dawn", 2).unwrap();

    assert_eq!(capsule.squarings(), &Integer::from(240));

    let payload = PuzzleSolver::new(&capsule).solve().unwrap();

    assert!(payload.starts_with(b"attack at dawn"));
    let hint = String::from_utf8(payload[b"attack at dawn".len()..].to_vec()).unwrap();
    assert!(hint.starts_with(" (seed value b for p = "));
    assert!(hint.ends_with(')'));
}

/// Integration test: the text record is a faithful transport for the puzzle
#[test]
fn test_round_trip_through_record_text() {
    let mut engine = engine(7);
    let capsule = engine.create(b"buried treasure", 1).unwrap();

    let reloaded = Capsule::parse_record(&capsule.to_record_text()).unwrap();
    assert_eq!(reloaded, capsule);

    let direct = PuzzleSolver::new(&capsule).solve().unwrap();
    let from_text = PuzzleSolver::new(&reloaded).solve().unwrap();
    assert_eq!(direct, from_text);
}

/// Integration test: fast path and slow path agree on a generated group
#[test]
fn test_totient_shortcut_matches_squaring_chain() {
    let mut generator =
        PrimeGenerator::new(test_config(), ChaCha8Rng::seed_from_u64(99));
    let group = generator.build_modulus().unwrap();
    let token = CancellationToken::new();

    for t in [0u32, 1, 2, 100, 10_000] {
        let t = Integer::from(t);
        let fast = locked_value_via_totient(&group.phi, &group.n, &t).unwrap();
        let slow = locked_value_by_squaring(&group.n, &t, &token, |_, _| {}).unwrap();
        assert_eq!(fast, slow, "paths disagree at t = {t}");
    }
}

/// Integration test: the embedded seed hint really does locate a factor
#[test]
fn test_seed_hint_recovers_a_prime_factor() {
    let mut engine = engine(1234);
    let capsule = engine.create(b"factor me", 1).unwrap();

    let payload = PuzzleSolver::new(&capsule).solve().unwrap();
    let text = String::from_utf8(payload).unwrap();

    let marker = " (seed value b for p = ";
    let start = text.rfind(marker).unwrap() + marker.len();
    let seed = &text[start..text.len() - 1];

    let generator = PrimeGenerator::new(test_config(), ChaCha8Rng::seed_from_u64(0));
    let prime = generator.prime_from_seed(seed).unwrap();
    assert!(capsule.modulus().is_divisible(&prime.value));
}

/// Integration test: longer durations always mean more squarings
#[test]
fn test_longer_locks_cost_more_squarings() {
    let config = test_config();
    let mut previous = Integer::from(0);
    for minutes in [1u64, 2, 10, 60, 525_600] {
        let count = config.squaring_count(minutes);
        assert!(count > previous);
        previous = count;
    }
}

/// Integration test: independent capsules solve concurrently without
/// sharing anything
#[test]
fn test_independent_capsules_solve_concurrently() {
    use std::thread;

    let capsules: Vec<(Vec<u8>, Capsule)> = (0..4u64)
        .map(|i| {
            let secret = format!("secret number {i}").into_bytes();
            let capsule = engine(100 + i).create(&secret, 1).unwrap();
            (secret, capsule)
        })
        .collect();

    let handles: Vec<_> = capsules
        .into_iter()
        .map(|(secret, capsule)| {
            thread::spawn(move || {
                let payload = PuzzleSolver::new(&capsule).solve().unwrap();
                assert!(payload.starts_with(&secret));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

/// Integration test: distinct rng streams give distinct moduli
#[test]
fn test_distinct_rng_seeds_give_distinct_moduli() {
    let a = engine(1).create(b"a", 1).unwrap();
    let b = engine(2).create(b"b", 1).unwrap();
    assert_ne!(a.modulus(), b.modulus());
}

/// Integration test: the hand-checked scenario survives the whole stack
#[test]
fn test_hand_checked_scenario() {
    // p = 7, q = 11, t = 3, m = 5: w = 2^(2^3 mod 60) mod 77 = 25,
    // z = 5 XOR 25 = 28
    let capsule = Capsule::new(Integer::from(77), Integer::from(3), Integer::from(28));
    let payload = PuzzleSolver::new(&capsule).solve().unwrap();
    assert_eq!(payload, vec![5u8]);
}
