use capsule_types::{Capsule, CapsuleError};
use rand::rngs::ThreadRng;
use rug::Integer;
use tracing::{debug, info};

use crate::codec;
use crate::config::PuzzleConfig;
use crate::primes::{PrimeGenerator, RsaGroup, SeedSource};

/// Computes the locked value w = 2^(2^t mod phi) mod n.
///
/// Knowing phi collapses the exponent tower via Euler's theorem; this is
/// the creator's fast path and the reason phi must stay private.
pub fn locked_value_via_totient(
    phi: &Integer,
    modulus: &Integer,
    squarings: &Integer,
) -> Result<Integer, CapsuleError> {
    let u = Integer::from(2)
        .pow_mod(squarings, phi)
        .map_err(|_| CapsuleError::Arithmetic("2^t mod phi failed".into()))?;
    Integer::from(2)
        .pow_mod(&u, modulus)
        .map_err(|_| CapsuleError::Arithmetic("2^u mod n failed".into()))
}

/// Appends the recovery hint: the seed whose power chain lands just below
/// the prime factor p.
pub fn payload_with_seed(secret: &[u8], p_seed: &Integer) -> Vec<u8> {
    let mut payload = secret.to_vec();
    payload.extend_from_slice(format!(" (seed value b for p = {p_seed})").as_bytes());
    payload
}

/// Seals secrets into time capsules.
pub struct PuzzleEngine<S = ThreadRng> {
    config: PuzzleConfig,
    primes: PrimeGenerator<S>,
}

impl PuzzleEngine<ThreadRng> {
    pub fn new(config: PuzzleConfig) -> Self {
        Self::with_seed_source(config, rand::thread_rng())
    }
}

impl<S: SeedSource> PuzzleEngine<S> {
    pub fn with_seed_source(config: PuzzleConfig, seeds: S) -> Self {
        let primes = PrimeGenerator::new(config.clone(), seeds);
        PuzzleEngine { config, primes }
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    /// Seals a secret behind roughly `minutes` of sequential work,
    /// generating a fresh modulus for this capsule.
    pub fn create(&mut self, secret: &[u8], minutes: u64) -> Result<Capsule, CapsuleError> {
        if minutes == 0 {
            return Err(CapsuleError::InvalidDuration(minutes));
        }
        let group = self.primes.build_modulus()?;
        self.create_with_group(&group, secret, minutes)
    }

    /// Seals a secret inside an already generated group.
    ///
    /// Fails with `PayloadTooLarge` when the encoded secret (including the
    /// seed hint) does not fit below the modulus; no record is emitted.
    pub fn create_with_group(
        &self,
        group: &RsaGroup,
        secret: &[u8],
        minutes: u64,
    ) -> Result<Capsule, CapsuleError> {
        if minutes == 0 {
            return Err(CapsuleError::InvalidDuration(minutes));
        }
        let squarings = self.config.squaring_count(minutes);
        info!(squarings = %squarings, minutes, "sealing capsule");

        let w = locked_value_via_totient(&group.phi, &group.n, &squarings)?;
        debug!(n = %group.n, "locked value computed");

        let payload = payload_with_seed(secret, &group.p_seed);
        let m = codec::payload_to_integer(&payload);
        if m >= group.n {
            return Err(CapsuleError::PayloadTooLarge {
                payload_bits: m.significant_bits(),
                modulus_bits: group.n.significant_bits(),
            });
        }

        let z = Integer::from(&m ^ &w);
        Ok(Capsule::new(group.n.clone(), squarings, z))
    }
}
