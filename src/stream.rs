//! Composite file assembly: `[header][0x03][data]`.
//!
//! [`split`] locates the header/data boundary by reading just enough of the
//! fixed prefix to learn the declared byte count and location-token length;
//! the full parse is then driven through the header and data codecs by
//! [`Composite::from_bytes`]. [`read_composite_file`] and
//! [`write_composite_file`] wrap the byte-level codec with buffered file
//! I/O; the codec itself never touches the filesystem.

use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::{data, header, Composite, CompositeError, CompositeResult};

/// Terminator byte separating header and data sections.
pub const TERMINATOR: u8 = 0x03;

/// Concatenates header bytes, the terminator byte and data bytes into one
/// composite byte stream.
pub fn assemble(header: &[u8], data: &[u8]) -> Vec<u8> {
    let mut stream = Vec::with_capacity(header.len() + 1 + data.len());
    stream.extend_from_slice(header);
    stream.push(TERMINATOR);
    stream.extend_from_slice(data);

    stream
}

/// Splits a composite byte stream into its header and data sections.
///
/// The header length is computed from the location-token length declared at
/// offset 79 and the terminator byte must follow immediately. The byte
/// count declared at offset 19 is the authoritative extent of the stream;
/// bytes past it are ignored.
///
/// # Arguments
///
/// * `stream` - the full composite byte stream
///
/// # Returns
///
/// The header slice and the data slice, without the terminator.
pub fn split(stream: &[u8]) -> CompositeResult<(&[u8], &[u8])> {
    if stream.len() < header::FIXED_PREFIX_LEN {
        return Err(CompositeError::MalformedHeader(format!(
            "stream holds {} bytes, shorter than the {}-byte fixed prefix",
            stream.len(),
            header::FIXED_PREFIX_LEN
        )));
    }

    let token_len = header::parse_number(stream, 79, 82, "location token length")? as usize;
    let header_len = header::FIXED_PREFIX_LEN + token_len;
    let byte_count = header::parse_number(stream, 19, 26, "byte count")? as usize;
    if byte_count < header_len + 1 {
        return Err(CompositeError::MalformedHeader(format!(
            "declared byte count {byte_count} is shorter than the {header_len}-byte header"
        )));
    }
    if stream.len() < byte_count {
        return Err(CompositeError::TruncatedStream {
            declared: byte_count,
            actual: stream.len(),
        });
    }
    if stream[header_len] != TERMINATOR {
        return Err(CompositeError::MalformedHeader(format!(
            "terminator byte 0x03 missing at offset {header_len}, found 0x{:02x}",
            stream[header_len]
        )));
    }

    Ok((&stream[..header_len], &stream[header_len + 1..byte_count]))
}

impl Composite {
    /// Encodes the composite into one byte stream.
    ///
    /// The grid length and the flag indices are checked against the
    /// declared geometry before encoding; the byte count declared in the
    /// header is derived from the same geometry.
    pub fn to_bytes(&self) -> CompositeResult<Vec<u8>> {
        let cells = self.metadata.grid_cells();
        if self.values.len() != cells {
            return Err(CompositeError::Unexpected(format!(
                "the grid holds {} values but the metadata declares {}x{}",
                self.values.len(),
                self.metadata.rows,
                self.metadata.cols
            )));
        }
        for (name, set) in [
            ("secondary", &self.flags.secondary),
            ("no-data", &self.flags.no_data),
            ("clutter", &self.flags.clutter),
        ] {
            if let Some(&index) = set.last() {
                if index >= cells {
                    return Err(CompositeError::Unexpected(format!(
                        "the {name} flag set holds index {index}, outside the {cells}-cell grid"
                    )));
                }
            }
        }

        let data = data::encode(&self.values, &self.flags, self.metadata.precision);
        let header = header::encode(&self.metadata, data.len())?;

        Ok(assemble(&header, &data))
    }

    /// Decodes one composite byte stream.
    ///
    /// The stream is split at the declared header boundary, the header is
    /// parsed into the metadata record, and the data section is decoded
    /// with the geometry and precision the header declares.
    pub fn from_bytes(stream: &[u8]) -> CompositeResult<Self> {
        let (header_bytes, data_bytes) = split(stream)?;
        let metadata = header::decode(header_bytes)?;
        let (values, flags) = data::decode(data_bytes, metadata.grid_cells(), metadata.precision)?;

        Ok(Self {
            metadata,
            values,
            flags,
        })
    }
}

/// Reads and decodes one composite file.
///
/// # Arguments
///
/// * `path` - path of the composite file
///
/// # Returns
///
/// The decoded [`Composite`].
pub fn read_composite_file<P>(path: P) -> CompositeResult<Composite>
where
    P: AsRef<Path>,
{
    let file = OpenOptions::new()
        .read(true)
        .open(path.as_ref())
        .map_err(|e| CompositeError::Open(format!("{e}")))?;
    let mut reader = BufReader::new(file);
    let mut stream = Vec::new();
    reader
        .read_to_end(&mut stream)
        .map_err(|e| CompositeError::Open(format!("{e}")))?;

    Composite::from_bytes(&stream)
}

/// Encodes and writes one composite file, replacing any existing file.
///
/// # Arguments
///
/// * `path` - destination path
/// * `composite` - the composite to encode
pub fn write_composite_file<P>(path: P, composite: &Composite) -> CompositeResult<()>
where
    P: AsRef<Path>,
{
    let stream = composite.to_bytes()?;
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path.as_ref())
        .map_err(|e| CompositeError::Open(format!("{e}")))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&stream)
        .map_err(|e| CompositeError::Open(format!("{e}")))?;
    writer
        .flush()
        .map_err(|e| CompositeError::Open(format!("{e}")))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::Duration;

    use crate::{CompositeMetadata, FlagIndexSets, MaxRange, Precision, Product};

    use super::*;

    fn small_composite() -> Composite {
        let metadata = CompositeMetadata {
            product: Product::Rw,
            timestamp: datetime!(2018-11-22 05:50),
            radar_id: "10000".to_string(),
            max_range: MaxRange::R150,
            format_version: "2.21.0".to_string(),
            precision: Precision::Tenth,
            interval: Duration::minutes(60),
            rows: 2,
            cols: 3,
            module_flag: 1,
            radar_locations: vec!["asb".to_string(), "boo".to_string()],
            byte_count: 0,
        };
        let byte_count = (metadata.header_len() + metadata.grid_cells() * 2 + 1) as u32;

        Composite {
            metadata: CompositeMetadata {
                byte_count,
                ..metadata
            },
            values: vec![0.0, 1.2, 0.5, 0.0, 2.5, 0.0],
            flags: FlagIndexSets {
                secondary: [1].into_iter().collect(),
                no_data: [3].into_iter().collect(),
                clutter: [5].into_iter().collect(),
            },
        }
    }

    #[test]
    fn split_inverts_assemble() {
        let composite = small_composite();
        let stream = composite.to_bytes().unwrap();
        let (header_bytes, data_bytes) = split(&stream).unwrap();
        assert_eq!(header_bytes.len(), composite.metadata.header_len());
        assert_eq!(data_bytes.len(), composite.metadata.grid_cells() * 2);
        assert_eq!(stream, assemble(header_bytes, data_bytes));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let composite = small_composite();
        let mut stream = composite.to_bytes().unwrap();
        stream.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(Composite::from_bytes(&stream).unwrap(), composite);
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let composite = small_composite();
        let stream = composite.to_bytes().unwrap();
        assert!(matches!(
            Composite::from_bytes(&stream[..stream.len() - 1]),
            Err(CompositeError::TruncatedStream { .. })
        ));
    }

    #[test]
    fn misplaced_terminator_is_rejected() {
        let composite = small_composite();
        let mut stream = composite.to_bytes().unwrap();
        let terminator_at = composite.metadata.header_len();
        stream[terminator_at] = b' ';
        assert!(matches!(
            Composite::from_bytes(&stream),
            Err(CompositeError::MalformedHeader(_))
        ));
    }

    #[test]
    fn mismatched_grid_length_is_rejected() {
        let mut composite = small_composite();
        composite.values.pop();
        assert!(matches!(
            composite.to_bytes(),
            Err(CompositeError::Unexpected(_))
        ));
    }

    #[test]
    fn out_of_range_flag_index_is_rejected() {
        let mut composite = small_composite();
        composite.flags.clutter.insert(6);
        assert!(matches!(
            composite.to_bytes(),
            Err(CompositeError::Unexpected(_))
        ));
    }
}
