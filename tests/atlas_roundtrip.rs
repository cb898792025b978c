//! End-to-end: raw records through the offline pipeline, out to bytes, back
//! into an atlas, and queried.

use terrapoint::{Atlas, Pipeline, RawCity, RawRegion, ResourceStore};

fn square(x: f64, y: f64, side: f64) -> Vec<[f64; 2]> {
    vec![[x, y], [x + side, y], [x + side, y + side], [x, y + side]]
}

fn city(name: &str, cc: &str, lat: f64, lon: f64, elev: Option<f32>, tz: &str) -> RawCity {
    RawCity {
        name: name.to_string(),
        country_code: cc.to_string(),
        latitude: lat,
        longitude: lon,
        elevation: elev,
        timezone: tz.to_string(),
    }
}

fn build_atlas() -> Atlas {
    let regions = vec![
        RawRegion {
            code: "ES".to_string(),
            // Mainland plus a near island that merges into one outline.
            fragments: vec![square(-9.0, 36.0, 8.0), square(-0.8, 38.5, 1.0)],
        },
        RawRegion {
            code: "FR".to_string(),
            fragments: vec![square(-1.0, 42.0, 8.0)],
        },
        RawRegion {
            code: "AD".to_string(),
            // A microstate nested inside FR's box.
            fragments: vec![square(1.4, 42.4, 0.4)],
        },
    ];
    let cities = vec![
        city("Madrid", "ES", 40.4168, -3.7038, Some(657.0), "Europe/Madrid"),
        city("Toledo", "ES", 39.8628, -4.0273, Some(529.0), "Europe/Madrid"),
        city("Paris", "FR", 48.8566, 2.3522, Some(35.0), "Europe/Paris"),
        city("Versailles", "FR", 48.8049, 2.1204, Some(132.0), "Europe/Paris"),
        city(
            "Andorra la Vella",
            "AD",
            42.5063,
            1.5218,
            Some(1023.0),
            "Europe/Andorra",
        ),
    ];

    let store = Pipeline::default().build(regions, cities);
    let bytes = store.to_bytes().expect("store encodes");
    let decoded = ResourceStore::from_bytes(&bytes).expect("store decodes and validates");
    Atlas::from_store(decoded).expect("atlas loads")
}

#[test]
fn country_resolution_through_serialized_store() {
    let atlas = build_atlas();

    let mark = atlas.locate(40.0, -4.0).unwrap();
    assert_eq!(mark.country_code.as_deref(), Some("ES"));

    // Andorra's box nests inside France's; the nested match wins.
    let mark = atlas.locate(42.5, 1.52).unwrap();
    assert_eq!(mark.country_code.as_deref(), Some("AD"));

    // Mid-Atlantic still resolves, to the nearest border.
    let mark = atlas.locate(30.0, -30.0).unwrap();
    assert_eq!(mark.country_code.as_deref(), Some("ES"));
}

#[test]
fn city_and_timezone_resolution() {
    let atlas = build_atlas();

    let mark = atlas.locate(48.86, 2.35).unwrap();
    let found = mark.city.expect("Paris is within range");
    assert_eq!(found.name, "Paris");
    assert_eq!(mark.timezone(), Some("Europe/Paris"));

    // A point with no city within 20 km.
    let mark = atlas.locate(37.0, -7.5).unwrap();
    assert!(mark.city.is_none());

    let loc = atlas
        .gazetteer()
        .find_location_for_time_zone("Europe/Andorra")
        .unwrap();
    assert_eq!(loc.latitude, 42.5063);
    assert_eq!(loc.longitude, 1.5218);
}

#[test]
fn elevation_interpolates_on_the_plateau() {
    let atlas = build_atlas();

    // Between Paris and Versailles; both anchor the estimate.
    let elevation = atlas
        .gazetteer()
        .find_elevation(48.83, 2.24)
        .unwrap()
        .expect("two candidates in range");
    assert!(elevation > 35.0 && elevation < 132.0);

    // Nothing near the middle of the Bay of Biscay.
    assert_eq!(atlas.gazetteer().find_elevation(45.5, -6.0).unwrap(), None);
}

#[test]
fn invalid_queries_fail_fast() {
    let atlas = build_atlas();
    assert!(atlas.locate(120.0, 0.0).is_err());
    assert!(atlas.locate(0.0, -999.0).is_err());
}
