use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;

/// A byte-oriented duplex channel to a physical device.
///
/// Every protocol exchange in this crate happens through this trait, so tests
/// can substitute a scripted transport for a real serial port. Reads block
/// until data arrives or the configured read timeout elapses; the timeout is
/// the only cancellation mechanism. Dropping a transport closes it, and a
/// closed transport cannot be reopened.
pub trait Transport: Read + Write + Send {
    /// Set the bound on how long a single read may block.
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    /// The currently configured read timeout.
    fn read_timeout(&self) -> Duration;

    /// Number of bytes buffered by the device side, readable without blocking.
    fn pending(&self) -> io::Result<u32>;
}

/// [`Transport`] backed by a serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port with the given baud rate and read timeout.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> io::Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(timeout)
            .open()
            .map_err(io::Error::from)?;
        Ok(Self { port })
    }

    /// Wrap an already opened serial port.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Transport for SerialTransport {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.port.set_timeout(timeout).map_err(io::Error::from)
    }

    fn read_timeout(&self) -> Duration {
        self.port.timeout()
    }

    fn pending(&self) -> io::Result<u32> {
        self.port.bytes_to_read().map_err(io::Error::from)
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .field("timeout", &self.port.timeout())
            .finish()
    }
}
