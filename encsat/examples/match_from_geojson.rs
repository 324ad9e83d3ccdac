// Example: matching chart platforms against reference labels in memory
use anyhow::Result;
use encsat::geo_core::PointRecord;
use encsat::geometric::collection::CategoryCollection;
use encsat::geometric::matcher::{CoordinateMatcher, MatchConfig};

fn main() -> Result<()> {
    println!("=== Example: Matching ENC platforms against Satlas labels ===\n");

    // Chart-derived points (Gulf of Mexico)
    let mut chart = CategoryCollection::new();
    chart.push(PointRecord::at("production platform", -90.6104, 28.1723));
    chart.push(PointRecord::at("production platform", -91.0021, 28.3310));
    chart.push(PointRecord::at("oil derrick/rig", -89.9876, 28.9012));

    // Reference points, slightly offset
    let reference = vec![
        PointRecord::at("offshore_platform", -90.6108, 28.1719),
        PointRecord::at("offshore_platform", -89.9871, 28.9015),
    ];

    let mut matcher = CoordinateMatcher::new(reference, MatchConfig::default());
    let table = matcher.run(&chart);

    println!("{}\n", table);
    for category in chart.category_names() {
        println!("  {}:", category);
        for point in table.get(category) {
            println!("    - ({:.4}, {:.4})", point.x(), point.y());
        }
    }
    println!(
        "\nReference records left unmatched: {}",
        matcher.remaining()
    );

    Ok(())
}
