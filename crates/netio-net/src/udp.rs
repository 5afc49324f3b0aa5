//! Thin UDP-flavored constructors over [`DatagramSocket`].

use crate::{address::SocketAddress, datagram::DatagramSocket, error::Error, socket::SocketCore};

/// Binds a fresh [`DatagramSocket`] to `addr`.
pub fn bind(addr: SocketAddress) -> Result<DatagramSocket, Error> {
    let mut socket = DatagramSocket::new();
    socket.bind(addr)?;
    Ok(socket)
}

/// Connects a fresh [`DatagramSocket`] so [`DatagramSocket::send`] can be
/// used without naming a remote on every call.
pub fn connect(addr: SocketAddress) -> Result<DatagramSocket, Error> {
    let mut socket = DatagramSocket::new();
    socket.connect_sync(addr)?;
    Ok(socket)
}

/// Resolves `host`/`port` via [`crate::resolve::resolve`], hinting a
/// datagram socket.
pub fn resolve_host(host: &str, port: u16) -> Result<Vec<SocketAddress>, Error> {
    crate::resolve::resolve(host, port, crate::raw::Kind::Datagram).map_err(Error::Resolve)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn connected_socket_sends_without_naming_remote() {
        let mut receiver = bind(SocketAddress::from_ipv4(Ipv4Addr::LOCALHOST, 0)).unwrap();
        let receiver_addr = receiver.local_addr().unwrap();

        let mut sender = connect(receiver_addr).unwrap();
        sender.send(b"hi").unwrap();

        let datagram = receiver.recv().unwrap().expect("a datagram should be ready");
        assert_eq!(datagram.payload, b"hi");
    }
}
