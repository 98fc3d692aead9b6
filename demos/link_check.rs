// Target link check
//
// Connects to the link-checker device and reports whether the target answers
// on its primary and secondary debug links.

use clap::Parser;
use glitcher_rs::{LinkChecker, Probe, SerialCandidateSource};

#[derive(Parser)]
#[command(about = "Probe the target's debug links")]
struct Args {
    /// Serial port of the link checker; scans all candidates when omitted
    #[arg(short, long)]
    port: Option<String>,

    /// Print the raw response bytes instead of the boolean verdicts
    #[arg(long)]
    raw: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let source = SerialCandidateSource::default();
    let mut checker = LinkChecker::connect(&source, args.port.as_deref())?;
    println!("Connected to link checker");

    if args.raw {
        for probe in [Probe::Primary, Probe::Secondary] {
            match checker.probe_raw(probe)? {
                Some(byte) => println!("{probe:?}: {byte:#04x}"),
                None => println!("{probe:?}: no answer within timeout"),
            }
        }
    } else {
        println!("primary link up:   {}", checker.check_primary_link()?);
        println!("secondary link up: {}", checker.check_secondary_link()?);
    }

    Ok(())
}
