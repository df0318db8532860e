use std::io;
use std::os::unix::io::AsRawFd;
use tokio::net::TcpStream;

/// The socket seam between the connection engine and the event loop.
///
/// All operations are non-blocking: a read or write that cannot proceed
/// returns `WouldBlock`, which the engine treats as "zero bytes now". This
/// trait is what lets the protocol tests drive a connection entirely in
/// memory.
pub trait Transport {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn try_write(&mut self, data: &[u8]) -> io::Result<usize>;
    /// Half-closes both directions. The descriptor itself is released when
    /// the transport is dropped.
    fn shutdown(&mut self) -> io::Result<()>;
}

/// A non-blocking TCP socket owned by its connection's drive task.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// The underlying stream, used by the drive loop for readiness waits.
    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }
}

impl Transport for TcpTransport {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.try_read(buf)
    }

    fn try_write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stream.try_write(data)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        // shutdown(2) rather than tokio's write-half shutdown: pending reads
        // must drain to zero as well.
        let fd = self.stream.as_raw_fd();
        // SAFETY: the fd is owned by `stream` and stays open for `self`'s
        // lifetime.
        if unsafe { libc::shutdown(fd, libc::SHUT_RDWR) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
