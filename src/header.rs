//! Fixed-column header codec.
//!
//! The header is an 82-byte ASCII prefix followed by a variable-length
//! radar-location token. Byte offsets (half-open ranges):
//!
//! ```text
//! [ 0, 2) product code            [41,43) "PR"
//! [ 2, 8) timestamp ddHHmm        [43,48) precision token
//! [ 8,13) radar id                [48,51) "INT"
//! [13,17) timestamp MMyy          [51,55) interval minutes, right-just. 4
//! [17,19) "BY"                    [55,57) "GP"
//! [19,26) byte count, right-j. 7  [57,66) rows rj. 4, "x", cols rj. 4
//! [26,28) "VS"                    [66,68) "MF"
//! [28,30) max-range token         [68]    blank
//! [30,32) "SW"                    [69,77) module flag, zero-padded 8
//! [32,41) version, right-just. 9  [77,79) "MS"
//!                                 [79,82) location token length, rj. 3
//! [82, ..) "<" + locations joined by "," + "> "
//! ```
//!
//! The format has no checksum; on decode every literal token is validated
//! at its exact offset as the structural integrity check.

use time::{Date, Duration, Month, PrimitiveDateTime, Time};

use crate::{CompositeError, CompositeMetadata, CompositeResult, MaxRange, Precision, Product};

/// Length of the fixed header prefix before the radar-location token.
pub const FIXED_PREFIX_LEN: usize = 82;

/// Maximum length of the radar-location token representable in the 3-digit
/// `MS` length field.
pub const MAX_LOCATION_TOKEN_LEN: usize = 999;

/// Encodes a metadata record into header bytes.
///
/// `data_len` is the length of the data section in bytes; the `BY` field
/// declares `data_len + header length + 1` (the terminator byte).
///
/// # Arguments
///
/// * `metadata` - the metadata record to lay out
/// * `data_len` - length of the data section in bytes
///
/// # Returns
///
/// The header bytes, `82 + location token length` long.
pub fn encode(metadata: &CompositeMetadata, data_len: usize) -> CompositeResult<Vec<u8>> {
    let location_token = metadata.radar_location_token();
    if location_token.len() > MAX_LOCATION_TOKEN_LEN {
        return Err(CompositeError::FieldOverflow {
            field: "radar-location token",
            value: location_token,
            width: MAX_LOCATION_TOKEN_LEN,
        });
    }
    if metadata.radar_id.len() != 5 {
        return Err(CompositeError::FieldOverflow {
            field: "radar id",
            value: metadata.radar_id.clone(),
            width: 5,
        });
    }
    let byte_count = FIXED_PREFIX_LEN + location_token.len() + data_len + 1;

    let ts = metadata.timestamp;
    let mut header = String::with_capacity(FIXED_PREFIX_LEN + location_token.len());
    header.push_str(metadata.product.code());
    header.push_str(&format!("{:02}{:02}{:02}", ts.day(), ts.hour(), ts.minute()));
    header.push_str(&metadata.radar_id);
    header.push_str(&format!(
        "{:02}{:02}",
        ts.month() as u8,
        ts.year().rem_euclid(100)
    ));
    header.push_str("BY");
    push_right(&mut header, "byte count", &byte_count.to_string(), 7)?;
    header.push_str("VS");
    header.push_str(metadata.max_range.token());
    header.push_str("SW");
    push_right(&mut header, "format version", &metadata.format_version, 9)?;
    header.push_str("PR");
    header.push_str(metadata.precision.token());
    header.push_str("INT");
    push_right(
        &mut header,
        "interval",
        &metadata.interval.whole_minutes().to_string(),
        4,
    )?;
    header.push_str("GP");
    push_right(&mut header, "rows", &metadata.rows.to_string(), 4)?;
    header.push('x');
    push_right(&mut header, "cols", &metadata.cols.to_string(), 4)?;
    header.push_str("MF");
    header.push(' ');
    push_zero_padded(&mut header, "module flag", metadata.module_flag, 8)?;
    header.push_str("MS");
    push_right(
        &mut header,
        "location token length",
        &location_token.len().to_string(),
        3,
    )?;
    header.push_str(&location_token);

    debug_assert_eq!(header.len(), metadata.header_len());
    Ok(header.into_bytes())
}

/// Decodes header bytes into a metadata record, the exact inverse of
/// [`encode`].
///
/// Bytes past the declared location token are ignored, so the full stream
/// may be passed as well as the exact header slice.
pub fn decode(header: &[u8]) -> CompositeResult<CompositeMetadata> {
    if header.len() < FIXED_PREFIX_LEN {
        return Err(CompositeError::MalformedHeader(format!(
            "header holds {} bytes, shorter than the {FIXED_PREFIX_LEN}-byte fixed prefix",
            header.len()
        )));
    }

    let product = Product::from_code(field_str(header, 0, 2, "product code")?)?;
    let day = parse_number(header, 2, 4, "timestamp day")?;
    let hour = parse_number(header, 4, 6, "timestamp hour")?;
    let minute = parse_number(header, 6, 8, "timestamp minute")?;
    let radar_id = field_str(header, 8, 13, "radar id")?.to_string();
    let month = parse_number(header, 13, 15, "timestamp month")?;
    let year = parse_number(header, 15, 17, "timestamp year")?;
    let timestamp = build_timestamp(day, hour, minute, month, year)?;

    expect_literal(header, 17, "BY")?;
    let byte_count = parse_number(header, 19, 26, "byte count")?;
    expect_literal(header, 26, "VS")?;
    let max_range = MaxRange::from_token(field_str(header, 28, 30, "max-range token")?)?;
    expect_literal(header, 30, "SW")?;
    let format_version = field_str(header, 32, 41, "format version")?
        .trim_start()
        .to_string();
    expect_literal(header, 41, "PR")?;
    let precision = Precision::from_token(field_str(header, 43, 48, "precision token")?)?;
    expect_literal(header, 48, "INT")?;
    let interval = Duration::minutes(parse_number(header, 51, 55, "interval")? as i64);
    expect_literal(header, 55, "GP")?;
    let rows = parse_number(header, 57, 61, "rows")? as usize;
    expect_literal(header, 61, "x")?;
    let cols = parse_number(header, 62, 66, "cols")? as usize;
    expect_literal(header, 66, "MF")?;
    let module_flag = parse_number(header, 69, 77, "module flag")?;
    expect_literal(header, 77, "MS")?;
    let location_token_len = parse_number(header, 79, 82, "location token length")? as usize;
    let radar_locations = parse_location_token(header, location_token_len)?;

    Ok(CompositeMetadata {
        product,
        timestamp,
        radar_id,
        max_range,
        format_version,
        precision,
        interval,
        rows,
        cols,
        module_flag,
        radar_locations,
        byte_count,
    })
}

/// Appends `value` right-justified into a `width`-column field.
fn push_right(
    header: &mut String,
    field: &'static str,
    value: &str,
    width: usize,
) -> CompositeResult<()> {
    if value.len() > width {
        return Err(CompositeError::FieldOverflow {
            field,
            value: value.to_string(),
            width,
        });
    }
    for _ in value.len()..width {
        header.push(' ');
    }
    header.push_str(value);
    Ok(())
}

/// Appends `value` zero-padded into a `width`-column field.
fn push_zero_padded(
    header: &mut String,
    field: &'static str,
    value: u32,
    width: usize,
) -> CompositeResult<()> {
    let rendered = value.to_string();
    if rendered.len() > width {
        return Err(CompositeError::FieldOverflow {
            field,
            value: rendered,
            width,
        });
    }
    for _ in rendered.len()..width {
        header.push('0');
    }
    header.push_str(&rendered);
    Ok(())
}

/// Slices the column `[start, end)` as ASCII text.
fn field_str<'a>(
    header: &'a [u8],
    start: usize,
    end: usize,
    field: &'static str,
) -> CompositeResult<&'a str> {
    std::str::from_utf8(&header[start..end]).map_err(|e| {
        CompositeError::MalformedHeader(format!(
            "the {field} field at offset {start} is not ASCII text: {e}"
        ))
    })
}

/// Parses the column `[start, end)` as a space-padded decimal number.
pub(crate) fn parse_number(
    header: &[u8],
    start: usize,
    end: usize,
    field: &'static str,
) -> CompositeResult<u32> {
    let text = field_str(header, start, end, field)?;
    text.trim_start().parse().map_err(|_| {
        CompositeError::MalformedHeader(format!(
            "the {field} field at offset {start} holds `{text}` instead of a number"
        ))
    })
}

/// Requires the literal token at its exact offset.
fn expect_literal(header: &[u8], at: usize, literal: &str) -> CompositeResult<()> {
    let found = &header[at..at + literal.len()];
    if found != literal.as_bytes() {
        return Err(CompositeError::MalformedHeader(format!(
            "expected `{literal}` at offset {at}, found `{}`",
            String::from_utf8_lossy(found)
        )));
    }
    Ok(())
}

fn build_timestamp(
    day: u32,
    hour: u32,
    minute: u32,
    month: u32,
    year: u32,
) -> CompositeResult<PrimitiveDateTime> {
    // Two-digit years pivot at 69, like the original reader's %y parsing.
    let year = if year >= 69 { 1900 + year } else { 2000 + year };
    let month = Month::try_from(month as u8).map_err(|e| {
        CompositeError::MalformedHeader(format!("the timestamp month `{month}` is invalid: {e}"))
    })?;
    let date = Date::from_calendar_date(year as i32, month, day as u8).map_err(|e| {
        CompositeError::MalformedHeader(format!(
            "the header timestamp does not form a valid date: {e}"
        ))
    })?;
    let time = Time::from_hms(hour as u8, minute as u8, 0).map_err(|e| {
        CompositeError::MalformedHeader(format!(
            "the header timestamp does not form a valid time: {e}"
        ))
    })?;

    Ok(PrimitiveDateTime::new(date, time))
}

/// Parses the trailing `"<" + codes + "> "` token using the length declared
/// in the `MS` field.
fn parse_location_token(header: &[u8], token_len: usize) -> CompositeResult<Vec<String>> {
    let end = FIXED_PREFIX_LEN + token_len;
    if header.len() < end {
        return Err(CompositeError::MalformedHeader(format!(
            "header holds {} bytes but declares a location token ending at {end}",
            header.len()
        )));
    }
    let token = field_str(header, FIXED_PREFIX_LEN, end, "radar-location token")?;
    let inner = token
        .strip_prefix('<')
        .and_then(|rest| rest.split_once('>'))
        .map(|(codes, _)| codes)
        .ok_or_else(|| {
            CompositeError::MalformedHeader(format!(
                "the radar-location token `{token}` is not bracketed"
            ))
        })?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    Ok(inner.split(',').map(str::to_string).collect())
}
