use time::format_description::FormatItem;
use time::macros::format_description;

use dwd_radolan::read_composite_file;

/// Timestamp format for the summary line.
const DATETIME_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day] [hour]:[minute]");

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "resources/raa01-rw_10000-1811220550-dwd---bin".to_string());
    let composite = read_composite_file(&path)?;
    let metadata = &composite.metadata;

    println!(
        "{} composite, {} at {}",
        metadata.product.code(),
        metadata.radar_id,
        metadata.timestamp.format(DATETIME_FMT)?,
    );
    println!(
        "grid {}x{}, precision {}, interval {} min, version {}",
        metadata.rows,
        metadata.cols,
        metadata.precision.factor(),
        metadata.interval.whole_minutes(),
        metadata.format_version,
    );
    println!("radars: {}", metadata.radar_locations.join(", "));

    let measured = composite
        .values
        .iter()
        .enumerate()
        .filter(|(index, _)| !composite.flags.no_data.contains(index));
    let (mut cells, mut wet, mut max) = (0usize, 0usize, f64::MIN);
    for (_, value) in measured {
        cells += 1;
        if *value > 0.0 {
            wet += 1;
        }
        max = max.max(*value);
    }
    println!(
        "{cells} measured cells, {wet} with precipitation, maximum {max:.2}; \
         {} secondary, {} no-data, {} clutter",
        composite.flags.secondary.len(),
        composite.flags.no_data.len(),
        composite.flags.clutter.len(),
    );

    Ok(())
}
