//! Socket capability: blocking TCP with per-socket timeouts.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{PlatformError, Result};

/// Default send and receive timeout applied to every new socket.
pub const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 3000;

/// Resolves a host name and port to a concrete socket address.
pub fn resolve_address(host: &str, port: u16) -> Result<SocketAddr> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| PlatformError::io("resolve", e))?;
    addrs
        .next()
        .ok_or_else(|| PlatformError::message(format!("no address found for {host}:{port}")))
}

/// A connected blocking TCP socket.
pub struct ClientSocket {
    stream: TcpStream,
    remote: SocketAddr,
}

impl ClientSocket {
    /// Connects to the given host and port, applying the default timeouts.
    pub fn connect(host: &str, port: u16) -> Result<ClientSocket> {
        let addr = resolve_address(host, port)?;
        let stream = TcpStream::connect(addr).map_err(|e| PlatformError::io("connect", e))?;
        ClientSocket::from_stream(stream, addr)
    }

    fn from_stream(stream: TcpStream, remote: SocketAddr) -> Result<ClientSocket> {
        let socket = ClientSocket { stream, remote };
        socket.set_send_timeout(DEFAULT_SOCKET_TIMEOUT_MS)?;
        socket.set_receive_timeout(DEFAULT_SOCKET_TIMEOUT_MS)?;
        Ok(socket)
    }

    /// Address of the remote peer.
    pub fn remote_peer(&self) -> SocketAddr {
        self.remote
    }

    /// Send timeout in milliseconds; 0 disables the timeout.
    pub fn set_send_timeout(&self, timeout_ms: u64) -> Result<()> {
        let timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
        self.stream
            .set_write_timeout(timeout)
            .map_err(|e| PlatformError::io("set_send_timeout", e))
    }

    /// Receive timeout in milliseconds; 0 disables the timeout.
    pub fn set_receive_timeout(&self, timeout_ms: u64) -> Result<()> {
        let timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
        self.stream
            .set_read_timeout(timeout)
            .map_err(|e| PlatformError::io("set_receive_timeout", e))
    }

    /// Writes the whole buffer, blocking up to the send timeout.
    pub fn send(&mut self, buffer: &[u8]) -> Result<()> {
        self.stream
            .write_all(buffer)
            .map_err(|e| PlatformError::io("send", e))
    }

    /// Reads up to `buffer.len()` bytes. Returns 0 on an orderly shutdown of
    /// the remote side.
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        self.stream
            .read(buffer)
            .map_err(|e| PlatformError::io("receive", e))
    }
}

/// A listening TCP socket accepting [`ClientSocket`] connections.
pub struct ServerSocket {
    listener: TcpListener,
}

impl ServerSocket {
    /// Binds to the given local port on all interfaces. Port 0 picks a free
    /// port; see [`local_port`](Self::local_port).
    pub fn bind(port: u16) -> Result<ServerSocket> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .map_err(|e| PlatformError::io("bind", e))?;
        Ok(ServerSocket { listener })
    }

    pub fn local_port(&self) -> Result<u16> {
        self.listener
            .local_addr()
            .map(|a| a.port())
            .map_err(|e| PlatformError::io("local_addr", e))
    }

    /// Blocks until a client connects; the returned socket carries the
    /// default timeouts.
    pub fn accept(&self) -> Result<ClientSocket> {
        let (stream, remote) = self
            .listener
            .accept()
            .map_err(|e| PlatformError::io("accept", e))?;
        ClientSocket::from_stream(stream, remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_localhost() {
        let addr = resolve_address("127.0.0.1", 4321).unwrap();
        assert_eq!(addr.port(), 4321);
    }

    #[test]
    fn client_server_round_trip() {
        let server = ServerSocket::bind(0).unwrap();
        let port = server.local_port().unwrap();

        let handle = std::thread::spawn(move || {
            let mut peer = server.accept().unwrap();
            let mut buf = [0u8; 5];
            let n = peer.receive(&mut buf).unwrap();
            peer.send(&buf[..n]).unwrap();
        });

        let mut client = ClientSocket::connect("127.0.0.1", port).unwrap();
        client.send(b"hello").unwrap();
        let mut buf = [0u8; 5];
        let n = client.receive(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
        assert_eq!(client.remote_peer().port(), port);

        handle.join().unwrap();
    }
}
