// Glitch campaign sweep
//
// Locates a glitcher, sweeps the (delay, pulse) grid, fires at every point
// and records the explored space to a campaign artifact. Outcome
// classification is stubbed: a real campaign driver would observe the target
// after each shot and pick the series accordingly.

use clap::Parser;
use glitcher_rs::{Glitcher, ParameterSpace, SeriesStyle, SerialCandidateSource};
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(about = "Sweep the (delay, pulse) grid and record the campaign")]
struct Args {
    /// Serial port of the glitcher; scans all candidates when omitted
    #[arg(short, long)]
    port: Option<String>,

    /// First delay of the sweep, in device ticks
    #[arg(long, default_value_t = 0)]
    delay_from: u32,

    /// Last delay of the sweep
    #[arg(long, default_value_t = 1000)]
    delay_to: u32,

    /// Delay step, at least 1
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
    delay_step: u32,

    /// Pulse widths to try at every delay
    #[arg(long, default_values_t = vec![20, 50, 100])]
    pulses: Vec<u32>,

    /// Where to write the campaign artifact
    #[arg(short, long, default_value = "campaign.json")]
    out: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let source = SerialCandidateSource::default();
    let mut glitcher = Glitcher::connect(&source, args.port.as_deref())?;
    println!("Connected to glitcher");

    let mut space = ParameterSpace::new();
    space.add_series("attempt", "Attempted", SeriesStyle::default())?;
    space.add_series("crash", "Target crashed", SeriesStyle::new("red", 0.8, 3))?;

    for delay in (args.delay_from..=args.delay_to).step_by(args.delay_step as usize) {
        for &pulse in &args.pulses {
            glitcher.set_delay(delay)?;
            glitcher.set_pulse(pulse)?;
            glitcher.flush()?;
            glitcher.glitch()?;

            // give the device time to apply the shot before the next command
            thread::sleep(Duration::from_millis(5));

            space.add_sample("attempt", i64::from(delay), i64::from(pulse))?;
        }
        glitcher.reset()?;
    }

    space.save(&args.out)?;
    println!(
        "Recorded {} shots across {} series to {}",
        space.sample_count(),
        space.len(),
        args.out
    );
    if let Some(bounds) = space.bounds() {
        println!(
            "Explored delays {}..{}, pulses {}..{}",
            bounds.min_delay, bounds.max_delay, bounds.min_pulse, bounds.max_pulse
        );
    }

    Ok(())
}
