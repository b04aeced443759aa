//! Signal ping example
//!
//! Light time to a few targets near and far, and a ping animation run to
//! completion on a simulated 60 Hz frame clock.
//!
//! Run with: cargo run --example signal_ping

use std::time::Duration;

use skyradar::scheduler::FrameQueue;
use skyradar::signallib::{light_time, PingAnimation, PingStatus};
use skyradar::RadarConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = RadarConfig::from_json_str(r#"{ "ping_max_wait_s": 10 }"#)?;

    let targets = [
        ("ISS", 420.0),
        ("GPS", 20_200.0),
        ("Geostationary", 35_786.0),
        ("Moon", 384_400.0),
        ("Voyager 1", 24.9e9),
    ];

    println!("=== Signal Light Time ===\n");
    for (name, km) in targets {
        let lt = light_time(km);
        let plan = config.ping_plan(km);
        println!(
            "{name:>14}: one way {:>12.4} s, round trip {:>12.4} s, shown in {:>6.3} s (×{:.0})",
            lt.one_way_s,
            lt.round_trip_s,
            plan.duration.as_secs_f64(),
            plan.compression
        );
    }
    println!();

    let mut frames = FrameQueue::new();
    let mut ping = PingAnimation::new();
    let plan = config.ping_plan(384_400.0);
    ping.start(plan, Duration::ZERO, &mut frames);

    let frame = Duration::from_micros(16_667);
    let mut now = Duration::ZERO;
    let mut next_report = 0.0;
    loop {
        now += frame;
        let Some(&request) = frames.drain().first() else {
            break;
        };
        match ping.on_frame(request, now, &mut frames) {
            PingStatus::Progress(p) if p >= next_report => {
                println!(
                    "t={:>5.2}s  progress {:>5.1}%  signal at {:.3} light-seconds",
                    now.as_secs_f64(),
                    p,
                    ping.virtual_elapsed_s(now)
                );
                next_report += 25.0;
            }
            PingStatus::Completed => {
                println!("t={:>5.2}s  echo received", now.as_secs_f64());
                break;
            }
            _ => {}
        }
    }

    Ok(())
}
