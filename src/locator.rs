use crate::protocol::{Command, CommandProtocol, ProtocolError};
use crate::transport::{SerialTransport, Transport};
use std::io;
use std::time::Duration;

/// Single-byte tag a device reports to distinguish its role.
///
/// Fixed for the lifetime of a transport and verified exactly once, when the
/// device is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub u8);

impl Identity {
    /// The fault-injection device itself.
    pub const GLITCHER: Self = Self(b'A');
    /// The companion device probing the target's debug links.
    pub const LINK_CHECKER: Self = Self(b'B');
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_ascii_graphic() {
            write!(f, "{}", self.0 as char)
        } else {
            write!(f, "{:#04x}", self.0)
        }
    }
}

/// Source of openable device paths.
///
/// Platform-specific enumeration lives behind this trait so the locator can
/// be exercised against fake candidates and ported to targets with other
/// discovery schemes.
pub trait CandidateSource {
    type Transport: Transport;

    /// Candidate device paths, in scan order.
    fn list_candidates(&self) -> io::Result<Vec<String>>;

    /// Open one candidate with the source's configured read timeout.
    fn open(&self, path: &str) -> io::Result<Self::Transport>;
}

/// [`CandidateSource`] enumerating USB serial ports.
#[derive(Debug, Clone)]
pub struct SerialCandidateSource {
    baud: u32,
    timeout: Duration,
}

impl SerialCandidateSource {
    pub fn new(baud: u32, timeout: Duration) -> Self {
        Self { baud, timeout }
    }
}

impl Default for SerialCandidateSource {
    fn default() -> Self {
        // 1s bounds the identify read on a non-responding device
        Self::new(9600, Duration::from_secs(1))
    }
}

impl CandidateSource for SerialCandidateSource {
    type Transport = SerialTransport;

    fn list_candidates(&self) -> io::Result<Vec<String>> {
        let ports = serialport::available_ports().map_err(io::Error::from)?;
        Ok(ports
            .into_iter()
            .filter(|p| matches!(p.port_type, serialport::SerialPortType::UsbPort(_)))
            .map(|p| p.port_name)
            .collect())
    }

    fn open(&self, path: &str) -> io::Result<SerialTransport> {
        SerialTransport::open(path, self.baud, self.timeout)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    #[error("No device with identity '{0}' found. Connect one or pass its port explicitly")]
    DeviceNotFound(Identity),

    #[error("Device at {path} identified as '{actual}', expected '{expected}'")]
    WrongIdentity {
        path: String,
        expected: Identity,
        actual: Identity,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Probes candidate transports with the identification exchange and hands out
/// the first one matching a requested identity.
pub struct DeviceLocator;

impl DeviceLocator {
    /// Scan all candidates once and return the first transport that
    /// identifies as `identity`.
    ///
    /// Candidates that cannot be opened or do not answer are skipped;
    /// non-matching transports are closed before moving on. Exhausting the
    /// candidate set is the only fatal outcome.
    pub fn locate<S: CandidateSource>(
        source: &S,
        identity: Identity,
    ) -> Result<S::Transport, LocatorError> {
        let candidates = source.list_candidates()?;
        log::debug!(
            "Scanning {} candidate port(s) for identity '{}'",
            candidates.len(),
            identity
        );

        for path in candidates {
            let transport = match source.open(&path) {
                Ok(t) => t,
                Err(e) => {
                    log::debug!("Skipping {path}: {e}");
                    continue;
                }
            };
            match Self::identify(transport) {
                Ok((t, id)) if id == identity => {
                    log::debug!("Found identity '{identity}' at {path}");
                    return Ok(t);
                }
                Ok((_, id)) => log::debug!("{path} identified as '{id}', not a match"),
                Err(e) => log::debug!("No identification from {path}: {e}"),
            }
        }

        Err(LocatorError::DeviceNotFound(identity))
    }

    /// Open one explicit path and verify it reports `identity`.
    pub fn acquire<S: CandidateSource>(
        source: &S,
        path: &str,
        identity: Identity,
    ) -> Result<S::Transport, LocatorError> {
        let transport = source.open(path)?;
        let (transport, actual) = Self::identify(transport)?;
        if actual == identity {
            Ok(transport)
        } else {
            Err(LocatorError::WrongIdentity {
                path: path.to_string(),
                expected: identity,
                actual,
            })
        }
    }

    fn identify<T: Transport>(transport: T) -> Result<(T, Identity), ProtocolError> {
        let mut proto = CommandProtocol::new(transport);
        let id = proto.query(Command::Identify)?;
        Ok((proto.into_inner(), Identity(id)))
    }
}
