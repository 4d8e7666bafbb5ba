use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use capsule_types::{Capsule, CapsuleError};
use rug::Integer;
use tracing::debug;

use crate::codec;

/// Client-side abandon switch for a running solve loop.
///
/// There is no checkpoint format: a cancelled solve restarts from zero.
#[derive(Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals cancellation to any listening solve loop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Checks if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Helper method for efficient modular squaring
#[inline]
fn square_mod(value: &mut Integer, modulus: &Integer) {
    value.square_mut();
    *value %= modulus;
}

/// Computes w = 2^(2^t) mod n the long way: t dependent squarings.
///
/// Each squaring consumes the previous result; that dependency chain is
/// what blocks any parallel shortcut for someone without phi.
pub fn locked_value_by_squaring<F>(
    modulus: &Integer,
    squarings: &Integer,
    cancelled: &CancellationToken,
    mut progress: F,
) -> Result<Integer, CapsuleError>
where
    F: FnMut(u64, u64),
{
    let mut w = Integer::from(2);

    let Some(total) = squarings.to_u64() else {
        return locked_value_by_squaring_large(modulus, squarings, cancelled, w);
    };

    let check_interval = (total / 100).clamp(1, 10_000);

    for i in 1..=total {
        if i % check_interval == 0 {
            if cancelled.is_cancelled() {
                return Err(CapsuleError::Cancelled);
            }
            progress(i, total);
        }
        square_mod(&mut w, modulus);
    }
    progress(total, total);
    Ok(w)
}

// Fallback for squaring counts that do not fit in u64. Cancellation is
// still honored, progress reporting is not attempted.
fn locked_value_by_squaring_large(
    modulus: &Integer,
    squarings: &Integer,
    cancelled: &CancellationToken,
    mut w: Integer,
) -> Result<Integer, CapsuleError> {
    const LARGE_CHECK_INTERVAL: u64 = 100_000;

    let mut remaining = squarings.clone();
    let mut check_counter = 0u64;

    while remaining > 0 {
        check_counter += 1;
        if check_counter >= LARGE_CHECK_INTERVAL {
            check_counter = 0;
            if cancelled.is_cancelled() {
                return Err(CapsuleError::Cancelled);
            }
        }
        square_mod(&mut w, modulus);
        remaining -= 1;
    }
    Ok(w)
}

/// Recovers payloads from capsules by brute sequential squaring.
pub struct PuzzleSolver<'a> {
    capsule: &'a Capsule,
}

impl<'a> PuzzleSolver<'a> {
    pub fn new(capsule: &'a Capsule) -> Self {
        PuzzleSolver { capsule }
    }

    /// Runs the full squaring chain and unmasks the payload.
    pub fn solve(&self) -> Result<Vec<u8>, CapsuleError> {
        self.solve_with_progress(&CancellationToken::new(), |_, _| {})
    }

    /// As `solve`, with periodic cancellation checks and progress reports.
    ///
    /// `progress` receives (done, total) at intervals while the squaring
    /// count fits in u64; larger counts fall back to a loop that only
    /// honors cancellation. The record is validated before any squaring
    /// starts.
    pub fn solve_with_progress<F>(
        &self,
        cancelled: &CancellationToken,
        progress: F,
    ) -> Result<Vec<u8>, CapsuleError>
    where
        F: FnMut(u64, u64),
    {
        self.capsule.validate()?;

        let w = locked_value_by_squaring(
            self.capsule.modulus(),
            self.capsule.squarings(),
            cancelled,
            progress,
        )?;
        debug!(n = %self.capsule.modulus(), "squaring chain finished");

        let m = Integer::from(&w ^ self.capsule.ciphertext());
        Ok(codec::integer_to_payload(&m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squaring_chain_hand_checked() {
        // 2 -> 4 -> 16 -> 256 mod 77 = 25 after three squarings
        let token = CancellationToken::new();
        let w = locked_value_by_squaring(
            &Integer::from(77),
            &Integer::from(3),
            &token,
            |_, _| {},
        )
        .unwrap();
        assert_eq!(w, Integer::from(25));
    }

    #[test]
    fn test_zero_squarings_leaves_base() {
        let token = CancellationToken::new();
        let w = locked_value_by_squaring(
            &Integer::from(77),
            &Integer::from(0),
            &token,
            |_, _| {},
        )
        .unwrap();
        assert_eq!(w, Integer::from(2));
    }

    #[test]
    fn test_solve_recovers_hand_checked_secret() {
        // z = 5 XOR 25 = 28; solving must give the single byte 5 back
        let capsule = Capsule::new(Integer::from(77), Integer::from(3), Integer::from(28));
        let payload = PuzzleSolver::new(&capsule).solve().unwrap();
        assert_eq!(payload, vec![5u8]);
    }

    #[test]
    fn test_solve_respects_cancellation() {
        let capsule = Capsule::new(
            Integer::from(77),
            Integer::from(100_000),
            Integer::from(28),
        );
        let token = CancellationToken::new();
        token.cancel();

        let result = PuzzleSolver::new(&capsule).solve_with_progress(&token, |_, _| {});
        assert!(matches!(result, Err(CapsuleError::Cancelled)));
    }

    #[test]
    fn test_solve_reports_progress() {
        let capsule = Capsule::new(
            Integer::from(77),
            Integer::from(1_000),
            Integer::from(28),
        );
        let token = CancellationToken::new();

        let mut reports = Vec::new();
        PuzzleSolver::new(&capsule)
            .solve_with_progress(&token, |done, total| reports.push((done, total)))
            .unwrap();

        assert!(!reports.is_empty());
        assert_eq!(reports.last(), Some(&(1_000, 1_000)));
        for (done, total) in reports {
            assert!(done <= total);
            assert_eq!(total, 1_000);
        }
    }

    #[test]
    fn test_solve_validates_before_squaring() {
        let capsule = Capsule::new(Integer::from(1), Integer::from(3), Integer::from(28));
        let result = PuzzleSolver::new(&capsule).solve();
        assert!(matches!(result, Err(CapsuleError::InvalidRecord(_))));
    }

    #[test]
    fn test_cancellation_token_functionality() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
        assert!(token.is_cancelled());
    }
}
