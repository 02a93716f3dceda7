use time::macros::datetime;

use dwd_radolan::{
    write_composite_file, Composite, CompositeMetadata, FlagIndexSets, MaxRange, Product,
};

fn main() -> anyhow::Result<()> {
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
        radar_locations: vec!["asb".to_string(), "boo".to_string(), "ros".to_string()],
        byte_count: 0,
    };
    metadata.byte_count = (metadata.header_len() + metadata.grid_cells() * 2 + 1) as u32;

    // A light band of rain across the middle of the grid, with the edges
    // marked as unmeasured.
    let mut values = vec![0.0; metadata.grid_cells()];
    let mut flags = FlagIndexSets::default();
    for col in 0..cols {
        values[450 * cols + col] = 0.5;
        flags.no_data.insert(col);
        flags.no_data.insert((rows - 1) * cols + col);
    }

    let composite = Composite {
        metadata,
        values,
        flags,
    };

    std::fs::create_dir_all("resources")?;
    let path = "resources/raa01-rw_10000-1811220550-dwd---bin";
    write_composite_file(path, &composite)?;
    println!(
        "wrote {} ({} bytes)",
        path, composite.metadata.byte_count
    );

    Ok(())
}
