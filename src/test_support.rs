//! Scripted in-memory transport for protocol-level tests.

use crate::transport::Transport;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;

/// A [`Transport`] that records every written byte and serves scripted
/// response bytes. `pending()` only counts stale bytes, mirroring a real
/// serial port where a response arrives after the request is transmitted
/// rather than sitting in the buffer beforehand.
#[derive(Debug)]
pub struct MockTransport {
    written: Vec<u8>,
    stale: VecDeque<u8>,
    replies: VecDeque<u8>,
    timeout: Duration,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            written: Vec::new(),
            stale: VecDeque::new(),
            replies: VecDeque::new(),
            timeout: Duration::from_millis(10),
        }
    }

    /// Mock that answers the next single-byte read with `byte`.
    pub fn replying(byte: u8) -> Self {
        let mut mock = Self::new();
        mock.push_response(byte);
        mock
    }

    /// Queue a response byte, served after any stale bytes are gone.
    pub fn push_response(&mut self, byte: u8) {
        self.replies.push_back(byte);
    }

    /// Queue a byte that is already sitting in the receive buffer.
    pub fn push_stale(&mut self, byte: u8) {
        self.stale.push_back(byte);
    }

    /// Everything written so far, in order.
    pub fn written(&self) -> Vec<u8> {
        self.written.clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.stale.pop_front().or_else(|| self.replies.pop_front()) {
            Some(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "mock read timed out")),
        }
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn read_timeout(&self) -> Duration {
        self.timeout
    }

    fn pending(&self) -> io::Result<u32> {
        Ok(self.stale.len() as u32)
    }
}
