use terrapoint::Atlas;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 4 {
        eprintln!("Usage: {} <database> <lat> <lon>", args[0]);
        return Ok(());
    }

    let bytes = std::fs::read(&args[1])?;
    let atlas = Atlas::from_bytes(&bytes)?;

    let lat: f64 = args[2].parse()?;
    let lon: f64 = args[3].parse()?;

    let mark = atlas.locate(lat, lon)?;

    match &mark.country_code {
        Some(code) => println!("Country: {}", code),
        None => println!("Country: none"),
    }
    match &mark.city {
        Some(city) => {
            println!("City: {} ({})", city.name, city.country_code);
            println!("  Distance: {:.1} km", city.distance_km);
            println!("  Timezone: {}", city.timezone);
            println!("  Coords: {}, {}", city.location.latitude, city.location.longitude);
        }
        None => println!("City: none within range"),
    }
    match mark.elevation {
        Some(elevation) => println!("Elevation: {:.0} m", elevation),
        None => println!("Elevation: unknown"),
    }

    Ok(())
}
