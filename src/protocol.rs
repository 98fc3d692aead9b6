use crate::transport::Transport;
use std::io;
use std::time::Duration;

/// Opcode the device answers with its identity byte.
pub const OP_IDENTIFY: u8 = 0x5A;
/// Opcode carrying a 4-byte little-endian pulse width.
pub const OP_SET_PULSE: u8 = 0x42;
/// Opcode carrying a 4-byte little-endian trigger delay.
pub const OP_SET_DELAY: u8 = 0x41;
/// Opcode that fires the glitch at the configured timing.
pub const OP_GLITCH: u8 = 0x43;
/// Opcode that returns device and target to baseline.
pub const OP_RESET: u8 = 0x44;
/// Primary link probe opcode (link-checker identity only).
pub const OP_PROBE_A: u8 = b'A';
/// Secondary link probe opcode (link-checker identity only).
pub const OP_PROBE_B: u8 = b'B';

/// One frame of the glitcher wire protocol.
///
/// The probe opcodes reuse the byte values of `SetDelay`/`SetPulse`; they are
/// only ever issued to a device that identified as a link checker, never on
/// the same transport as the glitch commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Configure the pulse width applied on the next [`Command::Glitch`].
    SetPulse(u32),
    /// Configure the delay between trigger and pulse.
    SetDelay(u32),
    /// Fire the fault injection.
    Glitch,
    /// Return device and target to baseline.
    Reset,
    /// Ask the device for its identity byte.
    Identify,
    /// Primary link capability probe.
    ProbeA,
    /// Secondary link capability probe.
    ProbeB,
}

impl Command {
    /// The single opcode byte that leads the frame.
    pub const fn opcode(self) -> u8 {
        match self {
            Self::SetPulse(_) => OP_SET_PULSE,
            Self::SetDelay(_) => OP_SET_DELAY,
            Self::Glitch => OP_GLITCH,
            Self::Reset => OP_RESET,
            Self::Identify => OP_IDENTIFY,
            Self::ProbeA => OP_PROBE_A,
            Self::ProbeB => OP_PROBE_B,
        }
    }

    /// Whether the device answers this command with a single response byte.
    pub const fn expects_response(self) -> bool {
        matches!(self, Self::Identify | Self::ProbeA | Self::ProbeB)
    }

    /// Encode the frame: opcode byte, then the payload in little-endian order.
    pub fn encode(self) -> Vec<u8> {
        match self {
            Self::SetPulse(width) => {
                let mut frame = vec![OP_SET_PULSE];
                frame.extend_from_slice(&width.to_le_bytes());
                frame
            }
            Self::SetDelay(delay) => {
                let mut frame = vec![OP_SET_DELAY];
                frame.extend_from_slice(&delay.to_le_bytes());
                frame
            }
            _ => vec![self.opcode()],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Link error: {0}")]
    Link(#[from] io::Error),

    #[error("Timeout after {waited:?} waiting for a response")]
    Timeout { waited: Duration },
}

/// Request/response sequencing over one [`Transport`].
///
/// Commands are applied by the device in transmission order; the protocol
/// performs no pipelining and no automatic retries. A single instance must
/// not be shared between threads without external serialization, as
/// interleaved writes would corrupt framing.
pub struct CommandProtocol<T: Transport> {
    transport: T,
}

impl<T: Transport> CommandProtocol<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Transmit one command. Fire-and-forget: no response is awaited, even
    /// for query opcodes. The caller owns any settling delay before the next
    /// command.
    pub fn send(&mut self, command: Command) -> Result<(), ProtocolError> {
        let frame = command.encode();
        log::trace!("tx opcode {:#04x}, {} byte frame", command.opcode(), frame.len());
        self.transport.write_all(&frame)?;
        self.transport.flush()?;
        Ok(())
    }

    /// Read exactly `n` response bytes, bounded by the transport timeout.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = vec![0u8; n];
        self.transport.read_exact(&mut buf).map_err(|e| self.map_read_err(e))?;
        Ok(buf)
    }

    /// Read and discard whatever the device has buffered.
    ///
    /// Must run before every query-style exchange: a leftover byte from a
    /// prior exchange would otherwise be misread as the new response.
    pub fn drain_pending(&mut self) -> Result<(), ProtocolError> {
        let pending = self.transport.pending()?;
        if pending > 0 {
            log::debug!("Draining {pending} stale byte(s)");
            let mut scratch = vec![0u8; pending as usize];
            self.transport.read_exact(&mut scratch)?;
        }
        Ok(())
    }

    /// Correlated write-then-read exchange: drain stale bytes, transmit the
    /// command, read the single response byte.
    pub fn query(&mut self, command: Command) -> Result<u8, ProtocolError> {
        debug_assert!(command.expects_response());
        self.drain_pending()?;
        self.send(command)?;
        let mut byte = [0u8; 1];
        self.transport
            .read_exact(&mut byte)
            .map_err(|e| self.map_read_err(e))?;
        Ok(byte[0])
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn map_read_err(&self, e: io::Error) -> ProtocolError {
        if e.kind() == io::ErrorKind::TimedOut {
            ProtocolError::Timeout {
                waited: self.transport.read_timeout(),
            }
        } else {
            ProtocolError::Link(e)
        }
    }
}
