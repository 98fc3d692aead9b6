//! # Glitcher RS
//!
//! A Rust library for driving a serial fault-injection device ("glitcher")
//! and recording the (delay, pulse) parameter space explored during an
//! attack campaign.
//!
//! The crate covers the device command protocol (framing, identification
//! handshake, request/response sequencing and timeout policy) and the
//! campaign data model (keyed sample series with running bounds and
//! persistence). Plotting and statistical analysis of the results are left
//! to external consumers of the read-only accessors.
//!
//! ## Features
//!
//! - **Cross-platform device discovery**: probes candidate serial ports with
//!   the identification handshake and binds the first matching device
//! - **Typed wire protocol**: the fixed command set as an enum with total,
//!   injective encoding
//! - **Campaign façades**: a write-only glitch controller and a boolean
//!   link checker over the same protocol core
//! - **Parameter-space collection**: keyed, styled sample series with
//!   incrementally tracked bounds and save/load persistence
//!
//! ## Examples
//!
//! ### Driving a campaign
//!
//! ```rust,no_run
//! use glitcher_rs::{Glitcher, ParameterSpace, SeriesStyle, SerialCandidateSource};
//!
//! let source = SerialCandidateSource::default();
//! let mut glitcher = Glitcher::connect(&source, None)?;
//!
//! let mut space = ParameterSpace::new();
//! space.add_series("crash", "Target crashed", SeriesStyle::new("red", 0.8, 3))?;
//!
//! for delay in (0..1000).step_by(100) {
//!     glitcher.set_delay(delay)?;
//!     glitcher.set_pulse(50)?;
//!     glitcher.glitch()?;
//!     // observe the target, then classify the outcome
//!     space.add_sample("crash", i64::from(delay), 50)?;
//! }
//!
//! space.save("campaign.json")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Checking the target's debug links
//!
//! ```rust,no_run
//! use glitcher_rs::{LinkChecker, SerialCandidateSource};
//!
//! let source = SerialCandidateSource::default();
//! let mut checker = LinkChecker::connect(&source, None)?;
//!
//! if checker.check_primary_link()? {
//!     println!("target is alive");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Restoring recorded data
//!
//! ```rust,no_run
//! use glitcher_rs::ParameterSpace;
//!
//! let space = ParameterSpace::load("campaign.json")?;
//! if let Some(bounds) = space.bounds() {
//!     println!("delays {}..{}", bounds.min_delay, bounds.max_delay);
//! }
//! for (key, series) in space.iter() {
//!     println!("{key}: {} samples", series.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod glitcher;
pub mod link_checker;
pub mod locator;
pub mod param_space;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod test_support;

// Re-export the main types for convenience
pub use glitcher::Glitcher;

pub use link_checker::{LinkChecker, Probe, ACK, NAK};

pub use locator::{
    CandidateSource, DeviceLocator, Identity, LocatorError, SerialCandidateSource,
};

pub use protocol::{Command, CommandProtocol, ProtocolError};

pub use transport::{SerialTransport, Transport};

pub use param_space::{
    Bounds, ParameterSample, ParameterSeries, ParameterSpace, ParameterSpaceError,
    PersistenceError, SeriesStyle,
};
