//! Encoder and decoder for RADOLAN composite files, the binary format the
//! DWD uses to distribute gridded precipitation estimates.
//!
//! A composite file carries one fixed-column ASCII header followed by a
//! single terminator byte and a packed array of little-endian 16-bit words:
//!
//! ```text
//! [header: 82 bytes + radar-location token][0x03][rows*cols words, u16 LE]
//! ```
//!
//! Each word overlays quality flags onto the scaled magnitude: bit 15 marks
//! clutter, bit 12 marks secondary-station interpolation, and the multi-bit
//! pattern `0b0010_1001_1100_0100` marks missing data. Decoding masks the
//! active flag regions out before scaling the remaining bits by the header's
//! precision, so magnitudes must stay below `0x1000` to survive a round
//! trip unchanged.
//!
//! The codec is pure and stateless: [`Composite::to_bytes`] and
//! [`Composite::from_bytes`] transform fully materialized buffers, and
//! [`read_composite_file`]/[`write_composite_file`] wrap them with buffered
//! file I/O.

pub mod data;
pub mod header;
pub mod stream;
pub mod tokens;

pub use stream::{assemble, read_composite_file, split, write_composite_file};
pub use tokens::{MaxRange, Precision};

use std::collections::BTreeSet;

use time::{Duration, PrimitiveDateTime};

/// Products the codec can encode and decode.
///
/// The composite format is shared by many RADOLAN products that differ in
/// grid geometry, precision and accumulation interval. Each supported
/// product is one case of this enum carrying its canonical parameters;
/// product codes outside the enum fail with
/// [`CompositeError::UnsupportedProduct`] instead of being mis-decoded with
/// the wrong layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    /// RW, the hourly adjusted rainfall composite.
    Rw,
}

impl Product {
    /// Two-character product code recorded at the start of the header.
    pub fn code(self) -> &'static str {
        match self {
            Self::Rw => "RW",
        }
    }

    /// Looks up a product by its header code.
    pub fn from_code(code: &str) -> CompositeResult<Self> {
        match code {
            "RW" => Ok(Self::Rw),
            _ => Err(CompositeError::UnsupportedProduct(code.to_string())),
        }
    }

    /// Canonical grid geometry of the product as (rows, cols).
    pub fn grid_shape(self) -> (usize, usize) {
        match self {
            Self::Rw => (900, 900),
        }
    }

    /// Physical units per raw magnitude unit.
    pub fn precision(self) -> Precision {
        match self {
            Self::Rw => Precision::Tenth,
        }
    }

    /// Accumulation interval of the product.
    pub fn interval(self) -> Duration {
        match self {
            Self::Rw => Duration::minutes(60),
        }
    }
}

/// Metadata record of one composite file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeMetadata {
    /// Product the file carries.
    pub product: Product,

    /// Observation time, minute precision.
    ///
    /// The header splits it across two fields, `ddHHmm` at offset 2 and
    /// `MMyy` at offset 13. Seconds are always zero after a decode.
    pub timestamp: PrimitiveDateTime,

    /// Originating composite/network id, exactly 5 ASCII characters
    /// (`"10000"` for the national composite).
    pub radar_id: String,

    /// Coverage-radius classification of the contributing radars.
    pub max_range: MaxRange,

    /// Version of the producing software, at most 9 characters.
    pub format_version: String,

    /// Physical units per raw magnitude unit.
    pub precision: Precision,

    /// Accumulation interval, whole minutes.
    pub interval: Duration,

    /// Grid geometry. The data section holds exactly `rows * cols` words
    /// in row-major order.
    pub rows: usize,
    pub cols: usize,

    /// Producer status bitfield, 8 decimal digits in the header. Opaque to
    /// the codec.
    pub module_flag: u32,

    /// Station codes of the radars contributing at this timestamp, in
    /// header order.
    pub radar_locations: Vec<String>,

    /// Total file length the header declares.
    ///
    /// Decoding stores the declared value; encoding derives it from the
    /// grid geometry and header length (`header_len + 2*rows*cols + 1`)
    /// and never consults the field.
    pub byte_count: u32,
}

impl CompositeMetadata {
    /// The trailing radar-location token, `"<" + codes joined by "," + "> "`.
    pub fn radar_location_token(&self) -> String {
        format!("<{}> ", self.radar_locations.join(","))
    }

    /// Header length in bytes: the fixed prefix plus the location token.
    pub fn header_len(&self) -> usize {
        header::FIXED_PREFIX_LEN + self.radar_location_token().len()
    }

    /// Number of grid cells, which is also the number of data words.
    pub fn grid_cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// Flat row-major pixel indices flagged with a quality condition.
///
/// The wire format permits one pixel to carry several flags at once; the
/// sets are kept independent and no exclusivity is enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagIndexSets {
    /// Value derived from interpolated/secondary station data.
    pub secondary: BTreeSet<usize>,

    /// No measurement available.
    pub no_data: BTreeSet<usize>,

    /// Radar clutter detected.
    pub clutter: BTreeSet<usize>,
}

/// One decoded composite: metadata, physical-value grid and flag sets.
///
/// The grid is row-major with `metadata.rows * metadata.cols` values.
/// Missing pixels hold whatever sentinel the caller's missing-value policy
/// substitutes; the codec passes grid values through opaquely.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub metadata: CompositeMetadata,
    pub values: Vec<f64>,
    pub flags: FlagIndexSets,
}

impl Composite {
    /// Physical value at the given grid position.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.metadata.cols + col]
    }
}

/// Codec error type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompositeError {
    /// A value has no token in the enumeration tables, or a token read from
    /// a header is not one of the known encodings.
    #[error("no token defined for `{0}`")]
    UnknownToken(String),

    /// A rendered field does not fit its fixed column width during encode.
    #[error("value `{value}` does not fit the {width}-column {field} field")]
    FieldOverflow {
        field: &'static str,
        value: String,
        width: usize,
    },

    /// A required literal token or numeric field is wrong during decode.
    /// The format carries no checksum; the literal tokens are the only
    /// structural integrity check.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The stream is shorter than the length its header declares.
    #[error("stream holds {actual} bytes but the header declares {declared}")]
    TruncatedStream { declared: usize, actual: usize },

    /// The product code is outside the supported set.
    #[error("product `{0}` is not supported")]
    UnsupportedProduct(String),

    /// A composite file could not be read or written.
    #[error("failed to access the composite file: {0}")]
    Open(String),

    /// A caller-assembled composite violates a structural invariant, such
    /// as a grid whose length disagrees with its declared geometry.
    #[error("{0}")]
    Unexpected(String),
}

/// Codec result type.
pub type CompositeResult<T> = Result<T, CompositeError>;
