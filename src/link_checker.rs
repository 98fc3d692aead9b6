use crate::locator::{CandidateSource, DeviceLocator, Identity, LocatorError};
use crate::protocol::{Command, CommandProtocol, ProtocolError};
use crate::transport::Transport;

/// Response byte meaning the probed link is up.
pub const ACK: u8 = b'A';
/// Response byte meaning the probed link is down.
pub const NAK: u8 = b'B';

/// The two capability probes a link checker answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Primary debug link to the target.
    Primary,
    /// Secondary link.
    Secondary,
}

impl Probe {
    const fn command(self) -> Command {
        match self {
            Self::Primary => Command::ProbeA,
            Self::Secondary => Command::ProbeB,
        }
    }
}

/// Boolean capability queries over one shared transport.
///
/// Each probe drains stale bytes, writes one opcode and reads one response
/// byte within the transport's timeout. Probes must not overlap in time on a
/// shared handle, and a link checker must never share a transport with a
/// [`Glitcher`](crate::Glitcher): the probe opcodes reuse byte values of the
/// glitch timing commands.
pub struct LinkChecker<T: Transport> {
    proto: CommandProtocol<T>,
}

impl<T: Transport> LinkChecker<T> {
    /// Connect to a link checker, scanning the source's candidates or, if
    /// `port` is given, opening that path and verifying its identity.
    pub fn connect<S: CandidateSource<Transport = T>>(
        source: &S,
        port: Option<&str>,
    ) -> Result<Self, LocatorError> {
        let transport = match port {
            Some(path) => {
                log::debug!("Connecting to link checker on port {path}");
                DeviceLocator::acquire(source, path, Identity::LINK_CHECKER)?
            }
            None => DeviceLocator::locate(source, Identity::LINK_CHECKER)?,
        };
        Ok(Self::from_transport(transport))
    }

    /// Wrap a transport whose identity has already been verified.
    pub fn from_transport(transport: T) -> Self {
        Self {
            proto: CommandProtocol::new(transport),
        }
    }

    /// Is the target responsive on the primary link?
    ///
    /// [`ACK`] means up, [`NAK`] means down. Any other byte and a timeout are
    /// indeterminate and reported as `false`; use [`probe_raw`](Self::probe_raw)
    /// to tell those apart.
    pub fn check_primary_link(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.probe_raw(Probe::Primary)? == Some(ACK))
    }

    /// Is the target responsive on the secondary link?
    pub fn check_secondary_link(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.probe_raw(Probe::Secondary)? == Some(ACK))
    }

    /// One probe exchange, exposing the raw response byte.
    ///
    /// Returns `Ok(None)` when the device did not answer within the timeout.
    /// Link failures still surface as errors.
    pub fn probe_raw(&mut self, probe: Probe) -> Result<Option<u8>, ProtocolError> {
        match self.proto.query(probe.command()) {
            Ok(byte) => Ok(Some(byte)),
            Err(ProtocolError::Timeout { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Discard buffered response bytes.
    pub fn flush(&mut self) -> Result<(), ProtocolError> {
        self.proto.drain_pending()
    }

    pub fn into_transport(self) -> T {
        self.proto.into_inner()
    }
}
