//! Platform socket primitives: descriptor type, creation, and the RAII
//! guard that closes it on every exit path (REDESIGN FLAGS item 2).

/// Address family a socket was created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    Inet,
    Inet6,
}

/// Transport type tag — the "virtual protocol and type tags" the spec's
/// socket base carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Stream,
    Datagram,
}

/// Half of a connection to shut down. See [`crate::socket::SocketCore::shutdown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shutdown {
    Read,
    Write,
    Both,
}

#[cfg(unix)]
mod sys {
    use std::{
        mem::MaybeUninit,
        net::{SocketAddr, SocketAddrV4, SocketAddrV6},
        os::fd::RawFd,
    };

    use super::{Domain, Kind};
    use crate::error::Error;

    pub type Descriptor = RawFd;

    pub(super) fn sockaddr_to_storage(addr: SocketAddr) -> (libc::sockaddr_storage, libc::socklen_t) {
        let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
        let len = match addr {
            SocketAddr::V4(v4) => {
                let sin = libc::sockaddr_in {
                    sin_family: libc::AF_INET as libc::sa_family_t,
                    sin_port: v4.port().to_be(),
                    sin_addr: libc::in_addr { s_addr: u32::from_ne_bytes(v4.ip().octets()) },
                    sin_zero: [0; 8],
                };
                unsafe {
                    std::ptr::write(std::ptr::addr_of_mut!(storage).cast::<libc::sockaddr_in>(), sin);
                }
                core::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t
            }
            SocketAddr::V6(v6) => {
                let sin6 = libc::sockaddr_in6 {
                    sin6_family: libc::AF_INET6 as libc::sa_family_t,
                    sin6_port: v6.port().to_be(),
                    sin6_flowinfo: v6.flowinfo(),
                    sin6_addr: libc::in6_addr { s6_addr: v6.ip().octets() },
                    sin6_scope_id: v6.scope_id(),
                };
                unsafe {
                    std::ptr::write(
                        std::ptr::addr_of_mut!(storage).cast::<libc::sockaddr_in6>(),
                        sin6,
                    );
                }
                core::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t
            }
        };
        (storage, len)
    }

    pub(super) fn storage_to_sockaddr(storage: &libc::sockaddr_storage) -> Option<SocketAddr> {
        match storage.ss_family as libc::c_int {
            libc::AF_INET => {
                let sin = unsafe { &*(std::ptr::from_ref(storage).cast::<libc::sockaddr_in>()) };
                let ip = std::net::Ipv4Addr::from(sin.sin_addr.s_addr.to_ne_bytes());
                Some(SocketAddr::V4(SocketAddrV4::new(ip, u16::from_be(sin.sin_port))))
            }
            libc::AF_INET6 => {
                let sin6 = unsafe { &*(std::ptr::from_ref(storage).cast::<libc::sockaddr_in6>()) };
                let ip = std::net::Ipv6Addr::from(sin6.sin6_addr.s6_addr);
                Some(SocketAddr::V6(SocketAddrV6::new(
                    ip,
                    u16::from_be(sin6.sin6_port),
                    sin6.sin6_flowinfo,
                    sin6.sin6_scope_id,
                )))
            }
            _ => None,
        }
    }

    pub fn bind(fd: Descriptor, addr: SocketAddr) -> Result<(), Error> {
        let (storage, len) = sockaddr_to_storage(addr);
        let rc = unsafe {
            libc::bind(fd, std::ptr::addr_of!(storage).cast::<libc::sockaddr>(), len)
        };
        if rc < 0 { Err(Error::Io(std::io::Error::last_os_error())) } else { Ok(()) }
    }

    pub fn connect(fd: Descriptor, addr: SocketAddr) -> Result<(), Error> {
        let (storage, len) = sockaddr_to_storage(addr);
        let rc = unsafe {
            libc::connect(fd, std::ptr::addr_of!(storage).cast::<libc::sockaddr>(), len)
        };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINPROGRESS) {
                return Ok(());
            }
            return Err(Error::Io(err));
        }
        Ok(())
    }

    pub fn listen(fd: Descriptor, backlog: i32) -> Result<(), Error> {
        if unsafe { libc::listen(fd, backlog) } < 0 {
            Err(Error::Io(std::io::Error::last_os_error()))
        } else {
            Ok(())
        }
    }

    pub fn accept(fd: Descriptor) -> Result<(Descriptor, SocketAddr), Error> {
        let mut storage = MaybeUninit::<libc::sockaddr_storage>::zeroed();
        let mut len = core::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
        let client = unsafe {
            libc::accept(fd, storage.as_mut_ptr().cast::<libc::sockaddr>(), &mut len)
        };
        if client < 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        let storage = unsafe { storage.assume_init() };
        let addr = storage_to_sockaddr(&storage)
            .ok_or_else(|| Error::Io(std::io::Error::from(std::io::ErrorKind::AddrNotAvailable)))?;
        Ok((client, addr))
    }

    pub fn local_addr(fd: Descriptor) -> Result<SocketAddr, Error> {
        let mut storage = MaybeUninit::<libc::sockaddr_storage>::zeroed();
        let mut len = core::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
        if unsafe { libc::getsockname(fd, storage.as_mut_ptr().cast::<libc::sockaddr>(), &mut len) } < 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        let storage = unsafe { storage.assume_init() };
        storage_to_sockaddr(&storage)
            .ok_or_else(|| Error::Io(std::io::Error::from(std::io::ErrorKind::AddrNotAvailable)))
    }

    pub fn peer_addr(fd: Descriptor) -> Result<SocketAddr, Error> {
        let mut storage = MaybeUninit::<libc::sockaddr_storage>::zeroed();
        let mut len = core::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
        if unsafe { libc::getpeername(fd, storage.as_mut_ptr().cast::<libc::sockaddr>(), &mut len) } < 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        let storage = unsafe { storage.assume_init() };
        storage_to_sockaddr(&storage)
            .ok_or_else(|| Error::Io(std::io::Error::from(std::io::ErrorKind::AddrNotAvailable)))
    }

    pub fn send(fd: Descriptor, buf: &[u8]) -> std::io::Result<usize> {
        let flags = msg_nosignal();
        let rc = unsafe { libc::send(fd, buf.as_ptr().cast(), buf.len(), flags) };
        if rc < 0 { Err(std::io::Error::last_os_error()) } else { Ok(rc as usize) }
    }

    pub fn recv(fd: Descriptor, buf: &mut [u8]) -> std::io::Result<usize> {
        let rc = unsafe { libc::recv(fd, buf.as_mut_ptr().cast(), buf.len(), 0) };
        if rc < 0 { Err(std::io::Error::last_os_error()) } else { Ok(rc as usize) }
    }

    pub fn sendto(fd: Descriptor, buf: &[u8], addr: SocketAddr) -> std::io::Result<usize> {
        let (storage, len) = sockaddr_to_storage(addr);
        let flags = msg_nosignal();
        let rc = unsafe {
            libc::sendto(
                fd,
                buf.as_ptr().cast(),
                buf.len(),
                flags,
                std::ptr::addr_of!(storage).cast::<libc::sockaddr>(),
                len,
            )
        };
        if rc < 0 { Err(std::io::Error::last_os_error()) } else { Ok(rc as usize) }
    }

    pub fn recvfrom(fd: Descriptor, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        let mut storage = MaybeUninit::<libc::sockaddr_storage>::zeroed();
        let mut len = core::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
        let rc = unsafe {
            libc::recvfrom(
                fd,
                buf.as_mut_ptr().cast(),
                buf.len(),
                0,
                storage.as_mut_ptr().cast::<libc::sockaddr>(),
                &mut len,
            )
        };
        if rc < 0 {
            return Err(std::io::Error::last_os_error());
        }
        let storage = unsafe { storage.assume_init() };
        let addr = storage_to_sockaddr(&storage)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 0)));
        Ok((rc as usize, addr))
    }

    /// `MSG_NOSIGNAL` where available so a write to a peer that reset the
    /// connection returns `EPIPE` instead of raising `SIGPIPE`.
    #[cfg(target_os = "linux")]
    fn msg_nosignal() -> libc::c_int {
        libc::MSG_NOSIGNAL
    }

    #[cfg(not(target_os = "linux"))]
    fn msg_nosignal() -> libc::c_int {
        0
    }

    pub fn domain_const(domain: Domain) -> libc::c_int {
        match domain {
            Domain::Inet => libc::AF_INET,
            Domain::Inet6 => libc::AF_INET6,
        }
    }

    pub fn type_const(kind: Kind) -> libc::c_int {
        match kind {
            Kind::Stream => libc::SOCK_STREAM,
            Kind::Datagram => libc::SOCK_DGRAM,
        }
    }

    pub fn create(domain: Domain, kind: Kind) -> Result<Descriptor, Error> {
        let fd = unsafe { libc::socket(domain_const(domain), type_const(kind), 0) };
        if fd < 0 { Err(Error::Io(std::io::Error::last_os_error())) } else { Ok(fd) }
    }

    pub fn close(fd: Descriptor) {
        unsafe {
            libc::close(fd);
        }
    }

    pub fn set_blocking(fd: Descriptor, blocking: bool) -> Result<(), Error> {
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFL, 0);
            if flags < 0 {
                return Err(Error::Io(std::io::Error::last_os_error()));
            }
            let flags =
                if blocking { flags & !libc::O_NONBLOCK } else { flags | libc::O_NONBLOCK };
            if libc::fcntl(fd, libc::F_SETFL, flags) < 0 {
                return Err(Error::Io(std::io::Error::last_os_error()));
            }
        }
        Ok(())
    }

    pub fn set_reuseaddr(fd: Descriptor) {
        let one: libc::c_int = 1;
        unsafe {
            libc::setsockopt(
                fd,
                libc::SOL_SOCKET,
                libc::SO_REUSEADDR,
                std::ptr::addr_of!(one).cast(),
                core::mem::size_of::<libc::c_int>() as libc::socklen_t,
            );
        }
    }

    /// Best-effort: failure does not abort, per spec §6.
    pub fn set_broadcast(fd: Descriptor) {
        let one: libc::c_int = 1;
        unsafe {
            libc::setsockopt(
                fd,
                libc::SOL_SOCKET,
                libc::SO_BROADCAST,
                std::ptr::addr_of!(one).cast(),
                core::mem::size_of::<libc::c_int>() as libc::socklen_t,
            );
        }
    }

    pub fn shutdown(fd: Descriptor, how: super::Shutdown) -> Result<(), Error> {
        let how = match how {
            super::Shutdown::Read => libc::SHUT_RD,
            super::Shutdown::Write => libc::SHUT_WR,
            super::Shutdown::Both => libc::SHUT_RDWR,
        };
        if unsafe { libc::shutdown(fd, how) } < 0 {
            let err = std::io::Error::last_os_error();
            // Already-disconnected peers report ENOTCONN; not a call error.
            if err.raw_os_error() == Some(libc::ENOTCONN) {
                return Ok(());
            }
            return Err(Error::Io(err));
        }
        Ok(())
    }
}

#[cfg(windows)]
mod sys {
    use std::net::{SocketAddr, SocketAddrV4, SocketAddrV6};

    use windows_sys::Win32::Networking::WinSock::{
        self, AF_INET, AF_INET6, SD_BOTH, SD_RECEIVE, SD_SEND, SOCK_DGRAM, SOCK_STREAM,
        SOCKADDR_IN, SOCKADDR_IN6, SOCKADDR_STORAGE, SOCKET, SOL_SOCKET, SO_BROADCAST,
        SO_REUSEADDR,
    };

    use super::{Domain, Kind};
    use crate::error::Error;

    pub type Descriptor = SOCKET;

    fn sockaddr_to_storage(addr: SocketAddr) -> (SOCKADDR_STORAGE, i32) {
        let mut storage: SOCKADDR_STORAGE = unsafe { std::mem::zeroed() };
        let len = match addr {
            SocketAddr::V4(v4) => {
                let mut sin: SOCKADDR_IN = unsafe { std::mem::zeroed() };
                sin.sin_family = AF_INET;
                sin.sin_port = v4.port().to_be();
                sin.sin_addr.S_un.S_addr = u32::from_ne_bytes(v4.ip().octets());
                unsafe {
                    std::ptr::write(std::ptr::addr_of_mut!(storage).cast::<SOCKADDR_IN>(), sin);
                }
                core::mem::size_of::<SOCKADDR_IN>() as i32
            }
            SocketAddr::V6(v6) => {
                let mut sin6: SOCKADDR_IN6 = unsafe { std::mem::zeroed() };
                sin6.sin6_family = AF_INET6;
                sin6.sin6_port = v6.port().to_be();
                sin6.sin6_addr.u.Byte = v6.ip().octets();
                unsafe {
                    std::ptr::write(std::ptr::addr_of_mut!(storage).cast::<SOCKADDR_IN6>(), sin6);
                }
                core::mem::size_of::<SOCKADDR_IN6>() as i32
            }
        };
        (storage, len)
    }

    fn storage_to_sockaddr(storage: &SOCKADDR_STORAGE) -> Option<SocketAddr> {
        match storage.ss_family {
            AF_INET => {
                let sin = unsafe { &*(std::ptr::from_ref(storage).cast::<SOCKADDR_IN>()) };
                let ip = std::net::Ipv4Addr::from(unsafe { sin.sin_addr.S_un.S_addr }.to_ne_bytes());
                Some(SocketAddr::V4(SocketAddrV4::new(ip, u16::from_be(sin.sin_port))))
            }
            AF_INET6 => {
                let sin6 = unsafe { &*(std::ptr::from_ref(storage).cast::<SOCKADDR_IN6>()) };
                let ip = std::net::Ipv6Addr::from(unsafe { sin6.sin6_addr.u.Byte });
                Some(SocketAddr::V6(SocketAddrV6::new(
                    ip,
                    u16::from_be(sin6.sin6_port),
                    0,
                    unsafe { sin6.Anonymous.sin6_scope_id },
                )))
            }
            _ => None,
        }
    }

    pub fn bind(fd: Descriptor, addr: SocketAddr) -> Result<(), Error> {
        let (storage, len) = sockaddr_to_storage(addr);
        let rc = unsafe {
            WinSock::bind(fd, std::ptr::addr_of!(storage).cast(), len)
        };
        if rc != 0 { Err(Error::Io(std::io::Error::last_os_error())) } else { Ok(()) }
    }

    pub fn connect(fd: Descriptor, addr: SocketAddr) -> Result<(), Error> {
        let (storage, len) = sockaddr_to_storage(addr);
        let rc = unsafe {
            WinSock::connect(fd, std::ptr::addr_of!(storage).cast(), len)
        };
        if rc != 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(WinSock::WSAEWOULDBLOCK) {
                return Ok(());
            }
            return Err(Error::Io(err));
        }
        Ok(())
    }

    pub fn listen(fd: Descriptor, backlog: i32) -> Result<(), Error> {
        if unsafe { WinSock::listen(fd, backlog) } != 0 {
            Err(Error::Io(std::io::Error::last_os_error()))
        } else {
            Ok(())
        }
    }

    pub fn accept(fd: Descriptor) -> Result<(Descriptor, SocketAddr), Error> {
        let mut storage: SOCKADDR_STORAGE = unsafe { std::mem::zeroed() };
        let mut len = core::mem::size_of::<SOCKADDR_STORAGE>() as i32;
        let client = unsafe {
            WinSock::accept(fd, std::ptr::addr_of_mut!(storage).cast(), &mut len)
        };
        if client == WinSock::INVALID_SOCKET {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        let addr = storage_to_sockaddr(&storage)
            .ok_or_else(|| Error::Io(std::io::Error::from(std::io::ErrorKind::AddrNotAvailable)))?;
        Ok((client, addr))
    }

    pub fn local_addr(fd: Descriptor) -> Result<SocketAddr, Error> {
        let mut storage: SOCKADDR_STORAGE = unsafe { std::mem::zeroed() };
        let mut len = core::mem::size_of::<SOCKADDR_STORAGE>() as i32;
        if unsafe { WinSock::getsockname(fd, std::ptr::addr_of_mut!(storage).cast(), &mut len) } != 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        storage_to_sockaddr(&storage)
            .ok_or_else(|| Error::Io(std::io::Error::from(std::io::ErrorKind::AddrNotAvailable)))
    }

    pub fn peer_addr(fd: Descriptor) -> Result<SocketAddr, Error> {
        let mut storage: SOCKADDR_STORAGE = unsafe { std::mem::zeroed() };
        let mut len = core::mem::size_of::<SOCKADDR_STORAGE>() as i32;
        if unsafe { WinSock::getpeername(fd, std::ptr::addr_of_mut!(storage).cast(), &mut len) } != 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        storage_to_sockaddr(&storage)
            .ok_or_else(|| Error::Io(std::io::Error::from(std::io::ErrorKind::AddrNotAvailable)))
    }

    pub fn send(fd: Descriptor, buf: &[u8]) -> std::io::Result<usize> {
        let rc = unsafe { WinSock::send(fd, buf.as_ptr(), buf.len() as i32, 0) };
        if rc < 0 { Err(std::io::Error::last_os_error()) } else { Ok(rc as usize) }
    }

    pub fn recv(fd: Descriptor, buf: &mut [u8]) -> std::io::Result<usize> {
        let rc = unsafe { WinSock::recv(fd, buf.as_mut_ptr(), buf.len() as i32, 0) };
        if rc < 0 { Err(std::io::Error::last_os_error()) } else { Ok(rc as usize) }
    }

    pub fn sendto(fd: Descriptor, buf: &[u8], addr: SocketAddr) -> std::io::Result<usize> {
        let (storage, len) = sockaddr_to_storage(addr);
        let rc = unsafe {
            WinSock::sendto(fd, buf.as_ptr(), buf.len() as i32, 0, std::ptr::addr_of!(storage).cast(), len)
        };
        if rc < 0 { Err(std::io::Error::last_os_error()) } else { Ok(rc as usize) }
    }

    pub fn recvfrom(fd: Descriptor, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        let mut storage: SOCKADDR_STORAGE = unsafe { std::mem::zeroed() };
        let mut len = core::mem::size_of::<SOCKADDR_STORAGE>() as i32;
        let rc = unsafe {
            WinSock::recvfrom(
                fd,
                buf.as_mut_ptr(),
                buf.len() as i32,
                0,
                std::ptr::addr_of_mut!(storage).cast(),
                &mut len,
            )
        };
        if rc < 0 {
            return Err(std::io::Error::last_os_error());
        }
        let addr = storage_to_sockaddr(&storage).unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 0)));
        Ok((rc as usize, addr))
    }

    pub fn domain_const(domain: Domain) -> i32 {
        match domain {
            Domain::Inet => AF_INET as i32,
            Domain::Inet6 => AF_INET6 as i32,
        }
    }

    pub fn type_const(kind: Kind) -> i32 {
        match kind {
            Kind::Stream => SOCK_STREAM,
            Kind::Datagram => SOCK_DGRAM,
        }
    }

    pub fn create(domain: Domain, kind: Kind) -> Result<Descriptor, Error> {
        let s = unsafe { WinSock::socket(domain_const(domain), type_const(kind), 0) };
        if s == WinSock::INVALID_SOCKET {
            Err(Error::Io(std::io::Error::last_os_error()))
        } else {
            Ok(s)
        }
    }

    pub fn close(fd: Descriptor) {
        unsafe {
            WinSock::closesocket(fd);
        }
    }

    pub fn set_blocking(fd: Descriptor, blocking: bool) -> Result<(), Error> {
        let mut mode: u32 = if blocking { 0 } else { 1 };
        if unsafe { WinSock::ioctlsocket(fd, WinSock::FIONBIO, &mut mode) } != 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    pub fn set_reuseaddr(fd: Descriptor) {
        let one: i32 = 1;
        unsafe {
            WinSock::setsockopt(
                fd,
                SOL_SOCKET as i32,
                SO_REUSEADDR as i32,
                std::ptr::addr_of!(one).cast(),
                core::mem::size_of::<i32>() as i32,
            );
        }
    }

    pub fn set_broadcast(fd: Descriptor) {
        let one: i32 = 1;
        unsafe {
            WinSock::setsockopt(
                fd,
                SOL_SOCKET as i32,
                SO_BROADCAST as i32,
                std::ptr::addr_of!(one).cast(),
                core::mem::size_of::<i32>() as i32,
            );
        }
    }

    pub fn shutdown(fd: Descriptor, how: super::Shutdown) -> Result<(), Error> {
        let how = match how {
            super::Shutdown::Read => SD_RECEIVE,
            super::Shutdown::Write => SD_SEND,
            super::Shutdown::Both => SD_BOTH,
        };
        if unsafe { WinSock::shutdown(fd, how) } != 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        Ok(())
    }
}

use crate::error::Error;

pub use sys::Descriptor;

/// Owns exactly one OS descriptor and closes it on drop. Duplication is not
/// supported: `RawSocket` is neither `Clone` nor `Copy`.
pub struct RawSocket {
    fd: Descriptor,
}

impl RawSocket {
    pub fn create(domain: Domain, kind: Kind) -> Result<Self, Error> {
        Ok(Self { fd: sys::create(domain, kind)? })
    }

    /// Wraps an already-open descriptor (e.g. one just returned by
    /// [`RawSocket::accept`]) so it is closed on drop like any other.
    ///
    /// # Safety
    /// `fd` must be a valid, open socket descriptor not owned by anyone else.
    pub unsafe fn from_raw(fd: Descriptor) -> Self {
        Self { fd }
    }

    pub fn as_raw(&self) -> Descriptor {
        self.fd
    }

    pub fn set_blocking(&self, blocking: bool) -> Result<(), Error> {
        sys::set_blocking(self.fd, blocking)
    }

    pub fn set_reuseaddr(&self) {
        sys::set_reuseaddr(self.fd);
    }

    pub fn set_broadcast(&self) {
        sys::set_broadcast(self.fd);
    }

    pub fn shutdown(&self, how: Shutdown) -> Result<(), Error> {
        sys::shutdown(self.fd, how)
    }

    pub fn bind(&self, addr: std::net::SocketAddr) -> Result<(), Error> {
        sys::bind(self.fd, addr)
    }

    /// Non-blocking connect attempts report `EINPROGRESS`/`WSAEWOULDBLOCK`
    /// as `Ok(())`; callers distinguish "connecting" from "connected" by
    /// later checking writability and `SO_ERROR`, not by this return value.
    pub fn connect(&self, addr: std::net::SocketAddr) -> Result<(), Error> {
        sys::connect(self.fd, addr)
    }

    pub fn listen(&self, backlog: i32) -> Result<(), Error> {
        sys::listen(self.fd, backlog)
    }

    /// Returns the accepted connection still wrapped in its raw descriptor
    /// form; callers promote it to a [`RawSocket`] via
    /// [`RawSocket::from_raw`] once they've decided what state to give it.
    pub fn accept(&self) -> Result<(Descriptor, std::net::SocketAddr), Error> {
        sys::accept(self.fd)
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr, Error> {
        sys::local_addr(self.fd)
    }

    pub fn peer_addr(&self) -> Result<std::net::SocketAddr, Error> {
        sys::peer_addr(self.fd)
    }

    pub fn send(&self, buf: &[u8]) -> std::io::Result<usize> {
        sys::send(self.fd, buf)
    }

    pub fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
        sys::recv(self.fd, buf)
    }

    pub fn sendto(&self, buf: &[u8], addr: std::net::SocketAddr) -> std::io::Result<usize> {
        sys::sendto(self.fd, buf, addr)
    }

    pub fn recvfrom(&self, buf: &mut [u8]) -> std::io::Result<(usize, std::net::SocketAddr)> {
        sys::recvfrom(self.fd, buf)
    }
}

impl Drop for RawSocket {
    fn drop(&mut self) {
        sys::close(self.fd);
    }
}

#[cfg(unix)]
impl std::os::fd::AsRawFd for RawSocket {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.fd
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};

    use super::*;

    #[test]
    fn loopback_tcp_accept_round_trips_peer_addr() {
        let listener = RawSocket::create(Domain::Inet, Kind::Stream).unwrap();
        listener.set_reuseaddr();
        let bind_addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0);
        listener.bind(bind_addr).unwrap();
        listener.listen(16).unwrap();
        let local = listener.local_addr().unwrap();

        let client = RawSocket::create(Domain::Inet, Kind::Stream).unwrap();
        client.connect(local).unwrap();

        let (accepted_fd, peer) = listener.accept().unwrap();
        let accepted = unsafe { RawSocket::from_raw(accepted_fd) };

        assert_eq!(peer.ip(), Ipv4Addr::LOCALHOST);
        assert_eq!(accepted.local_addr().unwrap(), local);
    }

    #[test]
    fn loopback_udp_sendto_recvfrom_round_trips() {
        let a = RawSocket::create(Domain::Inet, Kind::Datagram).unwrap();
        a.bind(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0)).unwrap();
        let b = RawSocket::create(Domain::Inet, Kind::Datagram).unwrap();
        b.bind(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0)).unwrap();

        let b_addr = b.local_addr().unwrap();
        a.sendto(b"hello", b_addr).unwrap();

        let mut buf = [0u8; 16];
        let (n, from) = b.recvfrom(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
        assert_eq!(from.ip(), Ipv4Addr::LOCALHOST);
    }
}
