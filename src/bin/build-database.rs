//! Offline database builder.
//!
//! Reads a country-borders GeoJSON and a GeoNames-style city table from
//! local files, runs the compaction pipeline, and writes the binary
//! resource store the runtime loads.

#[cfg(feature = "builder")]
mod input {
    use log::warn;
    use serde::Deserialize;
    use terrapoint::{RawCity, RawRegion};

    /// GeoNames feature codes counted as populated places.
    const FEATURE_CODES: &[&str] = &[
        "PPL", "PPLA", "PPLA2", "PPLA3", "PPLA4", "PPLC", "PPLG", "PPLS",
    ];

    #[derive(Deserialize)]
    struct FeatureCollection {
        features: Vec<Feature>,
    }

    #[derive(Deserialize)]
    struct Feature {
        properties: Properties,
        geometry: Geometry,
    }

    #[derive(Deserialize)]
    struct Properties {
        #[serde(rename = "ISO_A2", alias = "ISO_A2_EH", alias = "iso_a2")]
        iso_a2: String,
    }

    #[derive(Deserialize)]
    #[serde(tag = "type")]
    enum Geometry {
        Polygon {
            coordinates: Vec<Vec<[f64; 2]>>,
        },
        MultiPolygon {
            coordinates: Vec<Vec<Vec<[f64; 2]>>>,
        },
    }

    /// Loads country border fragments from a GeoJSON FeatureCollection.
    /// Only outer rings are kept; holes play no role in compacted outlines.
    pub fn read_regions(path: &str) -> Result<Vec<RawRegion>, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let fc: FeatureCollection = serde_json::from_str(&content)?;

        let regions = fc
            .features
            .into_iter()
            .map(|f| {
                let polygons = match f.geometry {
                    Geometry::Polygon { coordinates } => vec![coordinates],
                    Geometry::MultiPolygon { coordinates } => coordinates,
                };
                RawRegion {
                    code: f.properties.iso_a2,
                    fragments: polygons
                        .into_iter()
                        .filter_map(|mut rings| {
                            if rings.is_empty() {
                                None
                            } else {
                                Some(rings.swap_remove(0))
                            }
                        })
                        .collect(),
                }
            })
            .collect();
        Ok(regions)
    }

    /// Loads city records from a GeoNames main-table dump (tab-separated).
    pub fn read_cities(path: &str) -> Result<Vec<RawCity>, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;

        let cities = content
            .lines()
            .filter_map(|line| {
                let parts: Vec<&str> = line.split('\t').collect();
                if parts.len() < 18 || !FEATURE_CODES.contains(&parts[7]) {
                    return None;
                }

                let lat = parts[4].parse::<f64>().ok()?;
                let lon = parts[5].parse::<f64>().ok()?;
                // Surveyed elevation when present, DEM average otherwise.
                let elevation = parts[15]
                    .parse::<f32>()
                    .ok()
                    .or_else(|| parts[16].parse::<f32>().ok());

                Some(RawCity {
                    name: parts[2].to_string(),
                    country_code: parts[8].to_string(),
                    latitude: lat,
                    longitude: lon,
                    elevation,
                    timezone: parts.get(17).unwrap_or(&"").to_string(),
                })
            })
            .collect::<Vec<_>>();

        if cities.is_empty() {
            warn!("no usable city rows in {}", path);
        }
        Ok(cities)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "builder"))]
    {
        eprintln!("Error: This binary requires the 'builder' feature.");
        eprintln!("Build with: cargo run --release --bin build-database --features builder");
        std::process::exit(1);
    }

    #[cfg(feature = "builder")]
    {
        use terrapoint::Pipeline;

        env_logger::init();

        let args: Vec<String> = std::env::args().collect();
        if args.len() < 3 {
            eprintln!(
                "Usage: {} <borders.geojson> <cities.txt> [output]",
                args[0]
            );
            std::process::exit(1);
        }
        let output = args.get(3).map(String::as_str).unwrap_or("atlas.bin");

        println!("Reading borders from {}...", args[1]);
        let regions = input::read_regions(&args[1])?;

        println!("Reading cities from {}...", args[2]);
        let cities = input::read_cities(&args[2])?;

        println!(
            "Building database from {} regions and {} cities...",
            regions.len(),
            cities.len()
        );
        let store = Pipeline::default().build(regions, cities);
        let encoded = store.to_bytes()?;
        std::fs::write(output, &encoded)?;

        println!("Done! Database size: {} KB", encoded.len() / 1_000);
        Ok(())
    }
}
