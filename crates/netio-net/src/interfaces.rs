use crate::{address::SocketAddress, error::Error};

/// Restricts [`interfaces`] to a single address family, or returns both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterfaceFamily {
    Any,
    Ipv4Only,
    Ipv6Only,
}

impl InterfaceFamily {
    fn accepts(self, addr: &SocketAddress) -> bool {
        match self {
            InterfaceFamily::Any => true,
            InterfaceFamily::Ipv4Only => addr.is_ipv4(),
            InterfaceFamily::Ipv6Only => addr.is_ipv6(),
        }
    }
}

/// One local interface's name and address, as reported by the OS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub address: SocketAddress,
}

/// Enumerates local interfaces via `getifaddrs` (Unix) or
/// `GetAdaptersAddresses` (Windows). Loopback filtering applies uniformly
/// across IPv4 and IPv6. Returns an empty vector — not an error — when the
/// OS call itself fails in a way this crate can't usefully report further
/// (the underlying `Error` is still surfaced so a caller can log it).
pub fn interfaces(family: InterfaceFamily, include_loopback: bool) -> Result<Vec<Interface>, Error> {
    let all = platform::enumerate()?;
    Ok(all
        .into_iter()
        .filter(|iface| family.accepts(&iface.address))
        .filter(|iface| include_loopback || !iface.address.is_loopback())
        .collect())
}

#[cfg(unix)]
mod platform {
    use std::{ffi::CStr, net::Ipv6Addr};

    use super::Interface;
    use crate::{address::SocketAddress, error::Error};

    pub(super) fn enumerate() -> Result<Vec<Interface>, Error> {
        let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
        if unsafe { libc::getifaddrs(&mut head) } != 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }

        let mut out = Vec::new();
        let mut cur = head;
        while !cur.is_null() {
            let ifa = unsafe { &*cur };
            if !ifa.ifa_addr.is_null()
                && let Some(addr) = unsafe { sockaddr_to_socket_address(ifa.ifa_addr) }
            {
                let name = unsafe { CStr::from_ptr(ifa.ifa_name) }.to_string_lossy().into_owned();
                out.push(Interface { name, address: addr });
            }
            cur = ifa.ifa_next;
        }

        unsafe { libc::freeifaddrs(head) };
        Ok(out)
    }

    /// # Safety
    /// `sa` must point at a live `sockaddr` of family `AF_INET` or
    /// `AF_INET6` (or anything else, which is simply ignored).
    unsafe fn sockaddr_to_socket_address(sa: *const libc::sockaddr) -> Option<SocketAddress> {
        match unsafe { (*sa).sa_family } as libc::c_int {
            libc::AF_INET => {
                let sin = unsafe { &*(sa as *const libc::sockaddr_in) };
                let addr = u32::from_be(sin.sin_addr.s_addr);
                Some(SocketAddress::from_ipv4_u32(addr, 0))
            }
            libc::AF_INET6 => {
                let sin6 = unsafe { &*(sa as *const libc::sockaddr_in6) };
                let addr = Ipv6Addr::from(sin6.sin6_addr.s6_addr);
                Some(SocketAddress::from_ipv6(addr, 0))
            }
            _ => None,
        }
    }
}

#[cfg(windows)]
mod platform {
    use super::Interface;
    use crate::error::Error;

    /// `GetAdaptersAddresses` enumeration. The retry-on-`ERROR_BUFFER_OVERFLOW`
    /// loop mirrors the documented usage pattern for this API: the first call
    /// reports the buffer size actually needed, and the buffer is regrown
    /// exactly once more before giving up.
    pub(super) fn enumerate() -> Result<Vec<Interface>, Error> {
        use windows_sys::Win32::{
            Foundation::{ERROR_BUFFER_OVERFLOW, ERROR_SUCCESS},
            NetworkManagement::IpHelper::{
                GAA_FLAG_SKIP_ANYCAST, GAA_FLAG_SKIP_MULTICAST, GET_ADAPTERS_ADDRESSES_FLAGS,
                GetAdaptersAddresses, IP_ADAPTER_ADDRESSES_LH,
            },
            Networking::WinSock::{AF_UNSPEC, SOCKADDR_IN, SOCKADDR_IN6},
        };

        let flags: GET_ADAPTERS_ADDRESSES_FLAGS = GAA_FLAG_SKIP_ANYCAST | GAA_FLAG_SKIP_MULTICAST;
        let mut size: u32 = 16 * 1024;
        let mut buf: Vec<u8>;

        let result = loop {
            buf = vec![0u8; size as usize];
            let rc = unsafe {
                GetAdaptersAddresses(
                    AF_UNSPEC as u32,
                    flags,
                    std::ptr::null_mut(),
                    buf.as_mut_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>(),
                    &mut size,
                )
            };
            if rc == ERROR_BUFFER_OVERFLOW {
                continue;
            }
            break rc;
        };

        if result != ERROR_SUCCESS {
            return Err(Error::Io(std::io::Error::from_raw_os_error(result as i32)));
        }

        let mut out = Vec::new();
        let mut cur = buf.as_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>();
        while !cur.is_null() {
            let adapter = unsafe { &*cur };
            let name = unsafe { widestring_to_string(adapter.FriendlyName) };

            let mut unicast = adapter.FirstUnicastAddress;
            while !unicast.is_null() {
                let entry = unsafe { &*unicast };
                let sockaddr = entry.Address.lpSockaddr;
                if !sockaddr.is_null() {
                    let family = unsafe { (*sockaddr).sa_family };
                    let address = if family as i32 == windows_sys::Win32::Networking::WinSock::AF_INET {
                        let sin = unsafe { &*(sockaddr.cast::<SOCKADDR_IN>()) };
                        let octets = unsafe { sin.sin_addr.S_un.S_addr }.to_ne_bytes();
                        Some(crate::address::SocketAddress::from_ipv4(octets.into(), 0))
                    } else if family as i32 == windows_sys::Win32::Networking::WinSock::AF_INET6 {
                        let sin6 = unsafe { &*(sockaddr.cast::<SOCKADDR_IN6>()) };
                        let octets = unsafe { sin6.sin6_addr.u.Byte };
                        Some(crate::address::SocketAddress::from_ipv6(octets.into(), 0))
                    } else {
                        None
                    };
                    if let Some(address) = address {
                        out.push(Interface { name: name.clone(), address });
                    }
                }
                unicast = entry.Next;
            }

            cur = adapter.Next;
        }

        Ok(out)
    }

    unsafe fn widestring_to_string(ptr: windows_sys::core::PWSTR) -> String {
        if ptr.is_null() {
            return String::new();
        }
        let mut len = 0usize;
        unsafe {
            while *ptr.add(len) != 0 {
                len += 1;
            }
            let slice = std::slice::from_raw_parts(ptr, len);
            String::from_utf16_lossy(slice)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn loopback_present_when_requested_on_unix() {
        let with_loopback = interfaces(InterfaceFamily::Any, true).unwrap();
        assert!(with_loopback.iter().any(|i| i.address.is_loopback()));
    }

    #[test]
    fn loopback_filtered_out_when_excluded() {
        let without_loopback = interfaces(InterfaceFamily::Any, false).unwrap();
        assert!(without_loopback.iter().all(|i| !i.address.is_loopback()));
    }
}
