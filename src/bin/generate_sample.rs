//! Write a synthetic mast CSV in the raw export layout.
//!
//! Usage: `generate_sample [path] [rows]` (defaults: `sample_masts.csv`, 2000).

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// (MNC, weight) – roughly national market shares, plus codes no table maps.
const OPERATORS: [(i64, u32); 7] = [(30, 40), (60, 25), (20, 5), (50, 20), (2, 6), (1, 2), (99, 2)];

const GENERATIONS: [&str; 3] = ["2G", "3G", "4G"];

/// City centres the sites cluster around: (lat, lon, spread in degrees).
const CITIES: [(f64, f64, f64); 6] = [
    (6.5244, 3.3792, 0.25),  // Lagos
    (9.0765, 7.3986, 0.20),  // Abuja
    (12.0022, 8.5920, 0.20), // Kano
    (7.3775, 3.9470, 0.15),  // Ibadan
    (4.8156, 7.0498, 0.15),  // Port Harcourt
    (6.4584, 7.5464, 0.12),  // Enugu
];

// Nigeria's bounding box, for rural sites.
const LAT_RANGE: (f64, f64) = (4.27, 13.89);
const LON_RANGE: (f64, f64) = (2.69, 14.68);

fn pick_operator(rng: &mut StdRng) -> i64 {
    let total: u32 = OPERATORS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (mnc, weight) in OPERATORS {
        if roll < weight {
            return mnc;
        }
        roll -= weight;
    }
    OPERATORS[0].0
}

fn site_location(rng: &mut StdRng) -> (f64, f64) {
    if rng.gen_bool(0.8) {
        let (lat, lon, spread) = CITIES[rng.gen_range(0..CITIES.len())];
        (
            lat + rng.gen_range(-spread..spread),
            lon + rng.gen_range(-spread..spread),
        )
    } else {
        (
            rng.gen_range(LAT_RANGE.0..LAT_RANGE.1),
            rng.gen_range(LON_RANGE.0..LON_RANGE.1),
        )
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let path = PathBuf::from(args.next().unwrap_or_else(|| "sample_masts.csv".to_string()));
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("row count {n:?} is not a number"))?,
        None => 2000,
    };

    let mut rng = StdRng::seed_from_u64(42);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(["60", "50822", "Latitude_abs", "Longitude_abs", "Network_Generation"])?;

    let mut invalid = 0usize;
    for _ in 0..rows {
        let mnc = pick_operator(&mut rng);
        let cell_id = rng.gen_range(1000..60000u32);
        let generation = GENERATIONS[rng.gen_range(0..GENERATIONS.len())];
        let (lat, lon) = site_location(&mut rng);

        // About 1% of rows carry the kind of junk real exports contain.
        let (lat, lon) = if rng.gen_bool(0.01) {
            invalid += 1;
            ("N/A".to_string(), format!("{lon:.4}"))
        } else {
            (format!("{lat:.4}"), format!("{lon:.4}"))
        };

        writer.write_record([
            mnc.to_string(),
            cell_id.to_string(),
            lat,
            lon,
            generation.to_string(),
        ])?;
    }
    writer.flush()?;

    println!(
        "Wrote {rows} sites ({invalid} with invalid coordinates) to {}",
        path.display()
    );
    Ok(())
}
