//! Headless radar example
//!
//! Drives the radar engine for a few simulated seconds against a recording
//! surface and summarises what it drew: no window, no browser.
//!
//! Run with: cargo run --example radar_headless

use std::time::Duration;

use chrono::Utc;
use skyradar::radar::{DrawCommand, PointerKind, RadarEngine, RecordingSurface};
use skyradar::scheduler::FrameQueue;
use skyradar::sgp4lib::{future_path, visible_objects};
use skyradar::starlib::StarCatalog;
use skyradar::{ObserverLocation, OrbitalElementSet, RadarConfig, TrackedObject, ViewMode};

const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = RadarConfig::from_json_str(r#"{ "sweep_period_ms": 3000 }"#)?;
    let iss = TrackedObject::from_element_set(&OrbitalElementSet::new(
        "25544",
        "ISS (ZARYA)",
        "station",
        ISS_LINE1,
        ISS_LINE2,
    ))?;
    let observer = ObserverLocation::new("Berlin", 52.5, 13.4);

    // Pick a moment when the ISS is up, so there is something to draw
    let epoch = iss.elements().datetime.and_utc();
    let scan = future_path(&iss, epoch, 24.0 * 60.0, &observer, 1.0);
    let wall = scan
        .samples()
        .iter()
        .find(|s| s.is_visible())
        .and_then(|s| s.timestamp)
        .unwrap_or_else(Utc::now);

    let mut engine = RadarEngine::new(config.clone());
    let inputs = engine.inputs().clone();
    inputs.set_observer(Some(observer.clone()));
    inputs.set_view_mode(ViewMode::Sky);
    inputs.set_catalog(Some(StarCatalog::bright_stars()));
    inputs.set_objects(visible_objects(std::slice::from_ref(&iss), wall, &observer));

    let mut frames = FrameQueue::new();
    let mut surface = RecordingSurface::new(400.0, 400.0).with_device_pixel_ratio(2.0);
    engine.start(&mut frames);

    let mut drawn = 0;
    for frame in 0..375u64 {
        let t = frame * 16;
        for request in frames.drain() {
            engine.on_frame(request, Duration::from_millis(t), wall, &mut surface, &mut frames);
            drawn += 1;
        }
        if frame == 180 {
            // Select whatever is under the centre of the first target
            if let Some(target) = engine.targets().first().cloned() {
                let mut on_select = |id: Option<&str>| {
                    println!("selected: {id:?}");
                    inputs.set_selected(id.map(str::to_string));
                };
                engine.click(target.point.x, target.point.y, PointerKind::Mouse, &mut on_select);
                let path = future_path(
                    &iss,
                    wall,
                    config.path_minutes,
                    &observer,
                    config.path_step_minutes,
                );
                inputs.set_selected_path(Some(path));
            }
        }
    }
    engine.stop(&mut frames);

    let commands = surface.take();
    let count = |f: fn(&DrawCommand) -> bool| commands.iter().filter(|c| f(c)).count();
    println!("frames drawn:   {drawn}");
    println!("sweeps:         {}", engine.sweep_revolutions());
    println!("circles:        {}", count(|c| matches!(c, DrawCommand::Circle { .. })));
    println!("lines:          {}", count(|c| matches!(c, DrawCommand::Line { .. })));
    println!("path polylines: {}", count(|c| matches!(c, DrawCommand::Polyline { .. })));
    for target in engine.targets() {
        println!(
            "{} at ({:.1}, {:.1}), trail of {} points",
            target.id,
            target.point.x,
            target.point.y,
            engine.trails().get(&target.id).map_or(0, |h| h.len())
        );
    }

    Ok(())
}
