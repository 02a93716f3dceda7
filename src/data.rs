//! Flag-packed data codec.
//!
//! The data section is one little-endian `u16` word per grid cell in strict
//! row-major order. Quality flags are bitwise-OR'd onto the scaled
//! magnitude instead of living in fields of their own:
//!
//! ```text
//! bit 15          clutter
//! bit 12          secondary-station interpolation
//! 0b0010_1001_1100_0100   no-data pattern (multi-bit, tested as a whole)
//! ```
//!
//! Because the overlay shares word space with the magnitude, decoding must
//! mask the active flag regions out and interpret only the remaining bits.
//! Magnitude bits that coincide with an active pattern are claimed by the
//! flag and cannot be recovered; faithful round trips require magnitudes
//! below `0x1000`. Whether real composites ever need more of the word is
//! an open question of the format itself.

use crate::{CompositeError, CompositeResult, FlagIndexSets, Precision};

/// Set on pixels interpolated from secondary station data.
pub const SECONDARY_BIT: u16 = 0x1000;

/// Set on pixels with radar clutter.
pub const CLUTTER_BIT: u16 = 0x8000;

/// OR'd onto pixels without a measurement. A fixed multi-bit pattern, not a
/// single flag bit; a word counts as no-data only when every pattern bit is
/// set.
pub const NO_DATA_PATTERN: u16 = 0b0010_1001_1100_0100;

/// Encodes a physical-value grid and its flag sets into the data section.
///
/// Per pixel, the raw magnitude is `round(value / precision)` narrowed to
/// `u16`, with the flag bits of every set the pixel's flat index belongs to
/// OR'd on top. Missing pixels must already hold the caller's sentinel
/// value; the codec applies no missing-value policy of its own.
///
/// # Arguments
///
/// * `values` - row-major physical values, one per grid cell
/// * `flags` - flat indices carrying each quality flag
/// * `precision` - physical units per raw magnitude unit
///
/// # Returns
///
/// The data section bytes, `2 * values.len()` long.
pub fn encode(values: &[f64], flags: &FlagIndexSets, precision: Precision) -> Vec<u8> {
    let factor = precision.factor();
    let mut bytes = Vec::with_capacity(values.len() * 2);
    for (index, value) in values.iter().enumerate() {
        let mut word = (value / factor).round() as u16;
        if flags.secondary.contains(&index) {
            word |= SECONDARY_BIT;
        }
        if flags.no_data.contains(&index) {
            word |= NO_DATA_PATTERN;
        }
        if flags.clutter.contains(&index) {
            word |= CLUTTER_BIT;
        }
        bytes.extend_from_slice(&word.to_le_bytes());
    }

    bytes
}

/// Decodes the data section back into a physical-value grid and flag sets.
///
/// Per word, the flag tests are `word & CLUTTER_BIT != 0`,
/// `word & SECONDARY_BIT != 0` and `word & NO_DATA_PATTERN ==
/// NO_DATA_PATTERN`. The magnitude is the word with the single flag bits
/// stripped and, when the no-data test fired, the full pattern stripped as
/// well; it is then scaled by `precision`. No-data pixels keep their scaled
/// residual magnitude; substituting a sentinel is the caller's concern.
///
/// # Arguments
///
/// * `bytes` - the data section
/// * `cells` - expected number of grid cells (`rows * cols`)
/// * `precision` - physical units per raw magnitude unit
///
/// # Returns
///
/// The row-major physical values and the three reconstructed flag sets.
pub fn decode(
    bytes: &[u8],
    cells: usize,
    precision: Precision,
) -> CompositeResult<(Vec<f64>, FlagIndexSets)> {
    if bytes.len() != cells * 2 {
        return Err(CompositeError::TruncatedStream {
            declared: cells * 2,
            actual: bytes.len(),
        });
    }

    let factor = precision.factor();
    let mut values = Vec::with_capacity(cells);
    let mut flags = FlagIndexSets::default();
    for (index, pair) in bytes.chunks_exact(2).enumerate() {
        let word = u16::from_le_bytes([pair[0], pair[1]]);
        let mut magnitude = word & !(SECONDARY_BIT | CLUTTER_BIT);
        if word & SECONDARY_BIT != 0 {
            flags.secondary.insert(index);
        }
        if word & NO_DATA_PATTERN == NO_DATA_PATTERN {
            flags.no_data.insert(index);
            magnitude &= !NO_DATA_PATTERN;
        }
        if word & CLUTTER_BIT != 0 {
            flags.clutter.insert(index);
        }
        values.push(magnitude as f64 * factor);
    }

    Ok((values, flags))
}
