use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use socket2::{Domain, Protocol, SockRef, Socket, TcpKeepalive, Type};
use tracing::{debug, info};

/// A blocking, ordered byte channel to one server instance.
pub trait Transport: Read + Write {
    /// Applies a read/write timeout; `None` blocks indefinitely.
    fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;

    fn timeout(&self) -> io::Result<Option<Duration>>;

    fn shutdown(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_read_timeout(timeout)?;
        self.set_write_timeout(timeout)
    }

    fn timeout(&self) -> io::Result<Option<Duration>> {
        self.read_timeout()
    }

    fn shutdown(&mut self) -> io::Result<()> {
        match TcpStream::shutdown(self, Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

/// Opens a TCP connection with the socket options the driver relies on.
pub fn connect_tcp(
    host: &str,
    port: u16,
    connect_timeout: Duration,
    io_timeout: Option<Duration>,
) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        debug!(target: "scidb_client::net", "connecting to {}", addr);
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        match socket.connect_timeout(&addr.into(), connect_timeout) {
            Ok(()) => {
                let mut stream: TcpStream = socket.into();
                configure(&stream)?;
                stream.set_timeout(io_timeout)?;
                info!(target: "scidb_client::net", "connected to {}", addr);
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no address resolved for {}:{}", host, port),
        )
    }))
}

fn configure(stream: &TcpStream) -> io::Result<()> {
    let sock = SockRef::from(stream);
    sock.set_nodelay(true)?;
    sock.set_tcp_keepalive(&TcpKeepalive::new().with_time(Duration::from_secs(60)))?;
    Ok(())
}
