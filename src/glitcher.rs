use crate::locator::{CandidateSource, DeviceLocator, Identity, LocatorError};
use crate::protocol::{Command, CommandProtocol, ProtocolError};
use crate::transport::Transport;

/// Controller for the fault-injection device.
///
/// A thin façade over [`CommandProtocol`]: timing is configured write-only
/// (the device is authoritative, nothing is read back), and firing a glitch
/// carries no acknowledgement. Success is inferred by the campaign driver
/// observing the target. No command is ever retried here; retry policy and
/// settling delays between commands belong to the driver.
pub struct Glitcher<T: Transport> {
    proto: CommandProtocol<T>,
}

impl<T: Transport> Glitcher<T> {
    /// Connect to a glitcher, scanning the source's candidates or, if `port`
    /// is given, opening that path and verifying its identity.
    pub fn connect<S: CandidateSource<Transport = T>>(
        source: &S,
        port: Option<&str>,
    ) -> Result<Self, LocatorError> {
        let transport = match port {
            Some(path) => {
                log::debug!("Connecting to glitcher on port {path}");
                DeviceLocator::acquire(source, path, Identity::GLITCHER)?
            }
            None => DeviceLocator::locate(source, Identity::GLITCHER)?,
        };
        Ok(Self::from_transport(transport))
    }

    /// Wrap a transport whose identity has already been verified.
    pub fn from_transport(transport: T) -> Self {
        Self {
            proto: CommandProtocol::new(transport),
        }
    }

    /// Configure the pulse width applied on the next [`glitch`](Self::glitch).
    pub fn set_pulse(&mut self, width: u32) -> Result<(), ProtocolError> {
        self.proto.send(Command::SetPulse(width))
    }

    /// Configure the delay between trigger and pulse.
    pub fn set_delay(&mut self, delay: u32) -> Result<(), ProtocolError> {
        self.proto.send(Command::SetDelay(delay))
    }

    /// Fire the fault injection at the configured timing.
    pub fn glitch(&mut self) -> Result<(), ProtocolError> {
        self.proto.send(Command::Glitch)
    }

    /// Return device and target to baseline.
    pub fn reset(&mut self) -> Result<(), ProtocolError> {
        self.proto.send(Command::Reset)
    }

    /// Discard buffered response bytes between campaign iterations.
    pub fn flush(&mut self) -> Result<(), ProtocolError> {
        self.proto.drain_pending()
    }

    /// Raw read pass-through for protocols layered above this one.
    pub fn read(&mut self, size: usize) -> Result<Vec<u8>, ProtocolError> {
        self.proto.read(size)
    }

    pub fn into_transport(self) -> T {
        self.proto.into_inner()
    }
}
