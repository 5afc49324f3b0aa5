use std::{net::Ipv4Addr, thread};

use netio_net::{SocketAddress, SocketCore, tcp};

#[test]
fn tcp_roundtrip_across_threads() {
    let listener = tcp::listen(SocketAddress::from_ipv4(Ipv4Addr::LOCALHOST, 0), 4).unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut conn, _peer) = listener.accept().unwrap().expect("blocking accept always resolves");

        let mut buf = [0u8; 5];
        let n = conn.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
        conn.write(b"world").unwrap();
    });

    let client = thread::spawn(move || {
        let mut conn = tcp::connect(addr).unwrap();
        conn.write(b"hello").unwrap();
        let mut buf = [0u8; 5];
        let n = conn.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"world");
    });

    server.join().unwrap();
    client.join().unwrap();
}
