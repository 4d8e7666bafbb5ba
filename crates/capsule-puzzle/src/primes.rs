use capsule_types::CapsuleError;
use rand::Rng;
use rug::Integer;
use rug::integer::IsPrime;
use tracing::debug;

use crate::config::PuzzleConfig;

const MAX_CANDIDATES: u32 = 10_000;

/// Supplies the random decimal seeds that place prime searches.
///
/// The generator is deterministic given its seeds, so tests drive it with
/// a fixed rng and get reproducible groups.
pub trait SeedSource {
    /// Draws a seed length from `[lo, hi)`.
    fn seed_length(&mut self, lo: usize, hi: usize) -> usize;

    /// Produces a seed of exactly `digits` decimal digits.
    fn decimal_seed(&mut self, digits: usize) -> String;
}

impl<R: Rng> SeedSource for R {
    fn seed_length(&mut self, lo: usize, hi: usize) -> usize {
        self.gen_range(lo..hi)
    }

    fn decimal_seed(&mut self, digits: usize) -> String {
        (0..digits)
            .map(|_| char::from(b'0' + self.gen_range(0..10u8)))
            .collect()
    }
}

/// A prime together with the seed whose power chain found it.
#[derive(Debug, Clone)]
pub struct SeededPrime {
    pub value: Integer,
    pub seed: Integer,
}

/// The private side of a puzzle: the factorization and its totient.
///
/// `phi` and the seeds never enter a record; the seed for `p` is disclosed
/// only inside the encrypted payload, as a recovery hint.
#[derive(Debug, Clone)]
pub struct RsaGroup {
    pub p: Integer,
    pub q: Integer,
    pub n: Integer,
    pub phi: Integer,
    pub p_seed: Integer,
    pub q_seed: Integer,
}

pub struct PrimeGenerator<S> {
    config: PuzzleConfig,
    seeds: S,
}

impl<S: SeedSource> PrimeGenerator<S> {
    pub fn new(config: PuzzleConfig, seeds: S) -> Self {
        PrimeGenerator { config, seeds }
    }

    /// Deterministic half of the search: maps a decimal seed onto a
    /// pseudo-random candidate below 2^prime_bits, then advances to the
    /// next probable prime.
    pub fn prime_from_seed(&self, seed: &str) -> Result<SeededPrime, CapsuleError> {
        let exponent: Integer = Integer::parse(seed)
            .map(Integer::from)
            .map_err(|e| CapsuleError::Arithmetic(format!("seed {seed:?}: {e}")))?;
        let domain = Integer::from(1) << self.config.prime_bits;

        let start = Integer::from(self.config.seed_base)
            .pow_mod(&exponent, &domain)
            .map_err(|_| CapsuleError::Arithmetic("seed exponent must not be negative".into()))?;

        let value = self.next_prime_from(start)?;
        Ok(SeededPrime {
            value,
            seed: exponent,
        })
    }

    /// Draws a fresh seed and searches from it.
    pub fn generate_prime(&mut self) -> Result<SeededPrime, CapsuleError> {
        let digits = self
            .seeds
            .seed_length(self.config.seed_digits_min, self.config.seed_digits_max);
        let seed = self.seeds.decimal_seed(digits);
        self.prime_from_seed(&seed)
    }

    /// Generates two primes from independent seeds and combines them into
    /// a modulus and its totient. No cross-check relates the two searches;
    /// in particular a p == q collision is not rejected.
    pub fn build_modulus(&mut self) -> Result<RsaGroup, CapsuleError> {
        let p = self.generate_prime()?;
        let q = self.generate_prime()?;
        debug!(p = %p.value, q = %q.value, "primes found");

        let n = Integer::from(&p.value * &q.value);
        let phi = Integer::from(&p.value - 1u32) * Integer::from(&q.value - 1u32);

        Ok(RsaGroup {
            p: p.value,
            q: q.value,
            n,
            phi,
            p_seed: p.seed,
            q_seed: q.seed,
        })
    }

    fn next_prime_from(&self, start: Integer) -> Result<Integer, CapsuleError> {
        let mut candidate = start;
        if candidate.is_even() {
            candidate += 1;
        }

        let mut count = 0u32;
        while candidate.is_probably_prime(self.config.primality_reps) == IsPrime::No {
            count += 1;
            if count > MAX_CANDIDATES {
                return Err(CapsuleError::PrimalitySearchExhausted(MAX_CANDIDATES));
            }
            candidate += 2;
        }
        debug!(candidates = count, "prime search finished");
        Ok(candidate)
    }
}
