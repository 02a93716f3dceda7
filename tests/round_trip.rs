//! End-to-end tests over full composite byte streams.

use time::macros::datetime;

use dwd_radolan::{
    read_composite_file, write_composite_file, Composite, CompositeError, CompositeMetadata,
    FlagIndexSets, MaxRange, Product,
};

/// A synthetic RW composite on the product's canonical 900x900 grid.
fn rw_composite() -> Composite {
    let product = Product::Rw;
    let (rows, cols) = product.grid_shape();
    let mut metadata = CompositeMetadata {
        product,
        timestamp: datetime!(2018-11-22 05:50),
        radar_id: "10000".to_string(),
        max_range: MaxRange::R150,
        format_version: "2.21.0".to_string(),
        precision: product.precision(),
        interval: product.interval(),
        rows,
        cols,
        module_flag: 1,
        radar_locations: vec![
            "asb".to_string(),
            "boo".to_string(),
            "ros".to_string(),
            "hnr".to_string(),
            "umd".to_string(),
        ],
        byte_count: 0,
    };
    metadata.byte_count = (metadata.header_len() + metadata.grid_cells() * 2 + 1) as u32;

    let mut values = vec![0.0; metadata.grid_cells()];
    values[5] = 1.2;
    values[900] = 0.5;
    values[405_000] = 12.5;
    let flags = FlagIndexSets {
        secondary: [5, 900].into_iter().collect(),
        no_data: [0, 1, 899].into_iter().collect(),
        clutter: [899, 405_000].into_iter().collect(),
    };

    Composite {
        metadata,
        values,
        flags,
    }
}

#[test]
fn round_trip_is_lossless() -> anyhow::Result<()> {
    let composite = rw_composite();
    let stream = composite.to_bytes()?;
    assert_eq!(stream.len(), composite.metadata.byte_count as usize);

    let decoded = Composite::from_bytes(&stream)?;
    assert_eq!(decoded, composite);

    Ok(())
}

#[test]
fn encoding_is_deterministic() -> anyhow::Result<()> {
    let composite = rw_composite();
    assert_eq!(composite.to_bytes()?, composite.to_bytes()?);

    Ok(())
}

#[test]
fn secondary_pixel_scenario() -> anyhow::Result<()> {
    let composite = rw_composite();
    let stream = composite.to_bytes()?;

    // Pixel 5 carries 1.2 at precision 0.1 with only the secondary flag:
    // raw magnitude 12 OR 0x1000.
    let data_start = composite.metadata.header_len() + 1;
    let word_at = data_start + 5 * 2;
    let word = u16::from_le_bytes([stream[word_at], stream[word_at + 1]]);
    assert_eq!(word, 0x100C);

    let decoded = Composite::from_bytes(&stream)?;
    assert_eq!(decoded.value(0, 5), 1.2);
    assert!(decoded.flags.secondary.contains(&5));
    assert!(!decoded.flags.no_data.contains(&5));
    assert!(!decoded.flags.clutter.contains(&5));

    Ok(())
}

#[test]
fn overlapping_flags_survive_the_round_trip() -> anyhow::Result<()> {
    let composite = rw_composite();
    let decoded = Composite::from_bytes(&composite.to_bytes()?)?;
    assert!(decoded.flags.no_data.contains(&899));
    assert!(decoded.flags.clutter.contains(&899));

    Ok(())
}

#[test]
fn corrupted_geometry_literal_is_detected() -> anyhow::Result<()> {
    let mut stream = rw_composite().to_bytes()?;
    stream[55] = b'X';
    assert!(matches!(
        Composite::from_bytes(&stream),
        Err(CompositeError::MalformedHeader(_))
    ));

    Ok(())
}

#[test]
fn unknown_product_code_is_rejected() -> anyhow::Result<()> {
    let mut stream = rw_composite().to_bytes()?;
    stream[0] = b'Y';
    assert!(matches!(
        Composite::from_bytes(&stream),
        Err(CompositeError::UnsupportedProduct(_))
    ));

    Ok(())
}

#[test]
fn file_round_trip() -> anyhow::Result<()> {
    let composite = rw_composite();
    let path = std::env::temp_dir().join("dwd-radolan-rw-roundtrip.bin");
    write_composite_file(&path, &composite)?;
    let decoded = read_composite_file(&path);
    std::fs::remove_file(&path)?;
    assert_eq!(decoded?, composite);

    Ok(())
}

#[test]
fn missing_file_reports_open_error() {
    let result = read_composite_file("/nonexistent/raa01-rw-bin");
    assert!(matches!(result, Err(CompositeError::Open(_))));
}
