use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapsuleError {
    #[error("secret payload of {payload_bits} bits does not fit below the {modulus_bits}-bit modulus")]
    PayloadTooLarge {
        payload_bits: u32,
        modulus_bits: u32,
    },

    #[error("prime search gave up after {0} candidates")]
    PrimalitySearchExhausted(u32),

    #[error("invalid puzzle record: {0}")]
    InvalidRecord(String),

    #[error("duration must be at least one minute, got {0}")]
    InvalidDuration(u64),

    #[error("solving was cancelled")]
    Cancelled,

    #[error("arithmetic error: {0}")]
    Arithmetic(String),
}
