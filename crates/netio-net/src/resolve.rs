use crate::{address::SocketAddress, error::ResolveError, raw::Kind};

/// Resolves `host`/`port` into an ordered list of [`SocketAddress`]
/// candidates, hinting the resolver with the socket type/protocol the
/// caller intends to use them for (mirroring the source's `resolve(address,
/// family)` passing the owning socket's type/protocol into `getaddrinfo`).
pub fn resolve(host: &str, port: u16, kind: Kind) -> Result<Vec<SocketAddress>, ResolveError> {
    platform::resolve(host, port, kind)
}

#[cfg(unix)]
mod platform {
    use std::{ffi::CString, net::Ipv6Addr};

    use super::{Kind, ResolveError, SocketAddress};

    pub(super) fn resolve(host: &str, port: u16, kind: Kind) -> Result<Vec<SocketAddress>, ResolveError> {
        let c_host = CString::new(host).map_err(|_| ResolveError::Gai(libc::EAI_NONAME))?;
        let c_port = CString::new(port.to_string()).unwrap();

        let mut hints: libc::addrinfo = unsafe { std::mem::zeroed() };
        hints.ai_family = libc::AF_UNSPEC;
        hints.ai_socktype = match kind {
            Kind::Stream => libc::SOCK_STREAM,
            Kind::Datagram => libc::SOCK_DGRAM,
        };

        let mut result: *mut libc::addrinfo = std::ptr::null_mut();
        let rc = unsafe {
            libc::getaddrinfo(c_host.as_ptr(), c_port.as_ptr(), &hints, &mut result)
        };

        if rc != 0 {
            if rc == libc::EAI_SYSTEM {
                return Err(ResolveError::System(std::io::Error::last_os_error()));
            }
            return Err(ResolveError::Gai(rc));
        }

        let mut out = Vec::new();
        let mut cur = result;
        while !cur.is_null() {
            let info = unsafe { &*cur };
            if let Some(addr) = unsafe { to_socket_address(info) } {
                out.push(addr);
            }
            cur = info.ai_next;
        }
        unsafe { libc::freeaddrinfo(result) };
        Ok(out)
    }

    unsafe fn to_socket_address(info: &libc::addrinfo) -> Option<SocketAddress> {
        match info.ai_family {
            libc::AF_INET => {
                let sin = unsafe { &*(info.ai_addr as *const libc::sockaddr_in) };
                let addr = u32::from_be(sin.sin_addr.s_addr);
                let port = u16::from_be(sin.sin_port);
                Some(SocketAddress::from_ipv4_u32(addr, port))
            }
            libc::AF_INET6 => {
                let sin6 = unsafe { &*(info.ai_addr as *const libc::sockaddr_in6) };
                let addr = Ipv6Addr::from(sin6.sin6_addr.s6_addr);
                let port = u16::from_be(sin6.sin6_port);
                Some(SocketAddress::from_ipv6(addr, port))
            }
            _ => None,
        }
    }
}

#[cfg(not(unix))]
mod platform {
    use std::net::ToSocketAddrs;

    use super::{Kind, ResolveError, SocketAddress};

    /// Backed by the platform resolver (`getaddrinfo`-based on Windows) via
    /// `std::net::ToSocketAddrs`; `kind` is unused here since the standard
    /// library's resolver doesn't accept a socket-type hint.
    pub(super) fn resolve(
        host: &str,
        port: u16,
        _kind: Kind,
    ) -> Result<Vec<SocketAddress>, ResolveError> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(ResolveError::System)?
            .map(SocketAddress::from_std)
            .collect();
        Ok(addrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolving_a_literal_ip_returns_one_candidate() {
        let addrs = resolve("127.0.0.1", 0, Kind::Stream).unwrap();
        assert_eq!(addrs.len(), 1);
        assert!(addrs[0].is_loopback());
    }
}
