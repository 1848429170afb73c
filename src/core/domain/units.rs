//! Unit conversions between the mixed capacity units of the redfish API.
//!
//! The pod reports local storage and logical drives in GiB while this
//! crate's resource model keeps storage in bytes (memory stays in MiB on
//! both sides and needs no conversion). Every conversion lives here so that
//! no scraping code multiplies raw `1024` literals inline.

pub const BYTES_PER_GIB: u64 = 1 << 30;

/// Converts a GiB capacity (fractional values appear on logical drives) to bytes.
pub fn gib_to_bytes(gib: f64) -> u64 {
    if gib <= 0.0 {
        return 0;
    }
    (gib * BYTES_PER_GIB as f64) as u64
}

/// Converts a byte count to GiB for allocation payloads.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB as f64
}
