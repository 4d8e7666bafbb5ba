// Rivest-Shamir-Wagner time-lock puzzles: seal a secret behind a
// calibrated amount of sequential modular squaring.

pub mod codec;
pub mod config;
pub mod engine;
pub mod primes;
pub mod solver;

pub use config::PuzzleConfig;
pub use engine::{PuzzleEngine, locked_value_via_totient, payload_with_seed};
pub use primes::{PrimeGenerator, RsaGroup, SeedSource, SeededPrime};
pub use solver::{CancellationToken, PuzzleSolver, locked_value_by_squaring};
