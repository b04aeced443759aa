//! Satellite tracking example using SGP4
//!
//! Loads a TLE, computes where the satellite is in an observer's sky, lists
//! the passes of the next day and prints its orbital parameters.
//!
//! Run with: cargo run --example satellite_tracking

use skyradar::elementslib::orbital_parameters;
use skyradar::sgp4lib::passes::find_passes;
use skyradar::sgp4lib::{current_look_angle, future_path, parse_tle_catalog};
use skyradar::{ObserverLocation, TrackedObject};

const TLE: &str = "\
ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // In a real application, fetch current elements from Celestrak
    let sets = parse_tle_catalog(TLE, "station")?;
    let iss = TrackedObject::from_element_set(&sets[0])?;
    let observer = ObserverLocation::new("Berlin", 52.5, 13.4);

    println!("=== Satellite Tracking Example ===\n");
    println!("Satellite: {} ({})", iss.name, iss.id);
    println!("Observer:  {observer}");

    if let Some(p) = orbital_parameters(&iss) {
        println!(
            "Orbit:     {:.0} × {:.0} km, {:.2}°, {:.1} min",
            p.perigee_km, p.apogee_km, p.inclination_deg, p.period_minutes
        );
    }
    println!();

    let epoch = iss.elements().datetime.and_utc();
    match current_look_angle(&iss, epoch, &observer) {
        Some(pos) => {
            println!("At TLE epoch {}:", epoch.format("%Y-%m-%d %H:%M:%S UTC"));
            println!("  Azimuth:   {:7.2}°", pos.azimuth);
            println!("  Elevation: {:7.2}°", pos.elevation);
            println!("  Range:     {:7.1} km", pos.range_km);
            println!(
                "  Subpoint:  {:.2}°, {:.2}° at {:.1} km",
                pos.latitude, pos.longitude, pos.height_km
            );
            println!("  Speed:     {:.3} km/s", pos.velocity_km_s);
        }
        None => println!("Propagation failed at epoch"),
    }
    println!();

    let path = future_path(&iss, epoch, 24.0 * 60.0, &observer, 0.5);
    let passes = find_passes(&path);
    println!("Passes in the next 24 hours: {}", passes.len());
    for pass in &passes {
        let rise = pass
            .rise
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".into());
        let set = pass
            .set
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".into());
        println!(
            "  rise {rise}  culminate {} at {:5.1}° (az {:5.1}°)  set {set}",
            pass.culmination.format("%H:%M:%S"),
            pass.max_elevation,
            pass.culmination_azimuth
        );
    }

    Ok(())
}
