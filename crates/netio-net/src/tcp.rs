//! Thin TCP-flavored constructors over [`StreamSocket`], per spec §2's
//! "TCPSocket / UDPSocket" row.

use crate::{
    address::SocketAddress,
    error::Error,
    network_address::NetworkAddress,
    raw::RawSocket,
    resolve,
    socket::SocketCore,
    stream::StreamSocket,
};

/// Connects a fresh [`StreamSocket`] to `addr`.
pub fn connect(addr: SocketAddress) -> Result<StreamSocket, Error> {
    let mut socket = StreamSocket::new();
    socket.connect_sync(addr)?;
    Ok(socket)
}

/// Resolves `target` if it's a hostname, then connects to the first
/// reachable candidate.
pub fn connect_network(target: &NetworkAddress) -> Result<StreamSocket, Error> {
    let mut socket = StreamSocket::new();
    socket.connect_network(target)?;
    Ok(socket)
}

/// Binds and listens, returning a [`TcpListener`] ready to [`TcpListener::accept`].
pub fn listen(addr: SocketAddress, backlog: i32) -> Result<TcpListener, Error> {
    let mut socket = StreamSocket::new();
    socket.bind(addr)?;
    socket.listen(backlog)?;
    Ok(TcpListener { socket })
}

/// A bound, listening TCP socket. Each [`TcpListener::accept`] call produces
/// a new, independent [`StreamSocket`] already in the `Connected` state —
/// the "listening factory" from spec §4.6 (datagram sockets have no
/// equivalent since `accept` doesn't apply to them).
pub struct TcpListener {
    socket: StreamSocket,
}

impl TcpListener {
    pub fn local_addr(&self) -> Result<SocketAddress, Error> {
        self.socket.local_addr()
    }

    pub fn set_blocking(&mut self, blocking: bool) -> Result<(), Error> {
        self.socket.set_blocking(blocking)
    }

    /// Accepts one pending connection. In non-blocking mode, a would-block
    /// condition is surfaced as `Ok(None)` rather than an error.
    pub fn accept(&self) -> Result<Option<(StreamSocket, SocketAddress)>, Error> {
        match self.socket.raw()?.accept() {
            Ok((fd, peer)) => {
                let accepted = unsafe { RawSocket::from_raw(fd) };
                let blocking = self.socket.is_blocking();
                let stream = StreamSocket::from_accepted(accepted, blocking)?;
                Ok(Some((stream, SocketAddress::from_std(peer))))
            }
            Err(err) if err.is_would_block() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Resolves `host`/`port` via [`resolve::resolve`], hinting a stream socket.
pub fn resolve_host(host: &str, port: u16) -> Result<Vec<SocketAddress>, Error> {
    resolve::resolve(host, port, crate::raw::Kind::Stream).map_err(Error::Resolve)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn listen_then_connect_then_accept() {
        let listener = listen(SocketAddress::from_ipv4(Ipv4Addr::LOCALHOST, 0), 4).unwrap();
        let addr = listener.local_addr().unwrap();

        let _client = connect(addr).unwrap();
        let (accepted, _peer) = listener.accept().unwrap().expect("connection should be pending");
        assert_eq!(accepted.local_addr().unwrap().port(), addr.port());
    }
}
