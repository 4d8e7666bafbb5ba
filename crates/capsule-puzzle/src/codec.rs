use rug::Integer;
use rug::integer::Order;

/// Reads a payload as a big-endian integer, one byte per character.
pub fn payload_to_integer(bytes: &[u8]) -> Integer {
    Integer::from_digits(bytes, Order::MsfBe)
}

/// Writes an integer back to payload bytes.
///
/// Leading zero bytes do not survive the round trip: the first byte of a
/// recovered payload is always non-zero.
pub fn integer_to_payload(value: &Integer) -> Vec<u8> {
    value.to_digits::<u8>(Order::MsfBe)
}
