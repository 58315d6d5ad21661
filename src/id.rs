//! Trace and span identifier conversions.
//!
//! Identifiers are generated as unsigned 64-bit values, but the thrift wire
//! format only has signed integers and the instrumentation API exposes them
//! as lowercase hex strings. All three representations must round-trip
//! exactly; a mistake here corrupts every identifier crossing the boundary.

use crate::Error;

/// Render an optional identifier as lowercase hex with no leading zeros.
pub fn hex_of(id: Option<u64>) -> Option<String> {
    id.map(|id| format!("{id:x}"))
}

/// Interpret a hex string as a 64-bit unsigned bit pattern and reinterpret
/// those bits as a two's-complement signed value.
///
/// Values at or above `2^63` become negative:
///
/// ```
/// use zipkin_ot_reporter::id::unsigned_hex_to_signed_int;
///
/// assert_eq!(unsigned_hex_to_signed_int("17133d482ba4f605").unwrap(), 1662740067609015813);
/// assert_eq!(unsigned_hex_to_signed_int("b6dbb1c2b362bf51").unwrap(), -5270423489115668655);
/// ```
pub fn unsigned_hex_to_signed_int(hex: &str) -> Result<i64, Error> {
    Ok(u64::from_str_radix(hex, 16)? as i64)
}

/// The exact inverse of [`unsigned_hex_to_signed_int`]: reinterpret the
/// signed bit pattern as unsigned and render it as hex, with no sign and no
/// leading zeros.
pub fn signed_int_to_unsigned_hex(id: i64) -> String {
    format!("{:x}", id as u64)
}

/// Reinterpret an unsigned identifier as the signed value the wire carries.
pub(crate) fn signed_of(id: u64) -> i64 {
    id as i64
}
