use rug::Integer;

/// Calibration and group-generation parameters.
///
/// Everything that controls puzzle hardness or the deterministic prime
/// search is carried here explicitly, so alternate calibrations stay
/// testable and records stay interoperable.
#[derive(Debug, Clone)]
pub struct PuzzleConfig {
    /// Sequential modular squarings per second on reference hardware.
    pub squarings_per_second: u64,
    /// Bit length L of the prime search domain; search starts below 2^L.
    pub prime_bits: u32,
    /// Base raised to the seed exponent to place the search start.
    pub seed_base: u32,
    /// Inclusive lower bound on seed length, in decimal digits.
    pub seed_digits_min: usize,
    /// Exclusive upper bound on seed length, in decimal digits.
    pub seed_digits_max: usize,
    /// Miller-Rabin rounds; 40 bounds the error probability by 2^-80.
    pub primality_reps: u32,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            squarings_per_second: 125_000,
            prime_bits: 1024,
            seed_base: 5,
            seed_digits_min: 12,
            seed_digits_max: 16,
            primality_reps: 40,
        }
    }
}

impl PuzzleConfig {
    pub fn squarings_per_minute(&self) -> u64 {
        self.squarings_per_second * 60
    }

    /// Total squarings for the requested duration.
    pub fn squaring_count(&self, minutes: u64) -> Integer {
        Integer::from(self.squarings_per_minute()) * minutes
    }
}
