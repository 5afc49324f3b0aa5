use crate::address::SocketAddress;

/// Either a resolved [`SocketAddress`] or an unresolved `(hostname, port)`
/// pair. [`crate::socket::SocketCore::connect_network`] turns the latter
/// into an ordered list of [`SocketAddress`] candidates via
/// [`crate::resolve::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkAddress {
    Resolved(SocketAddress),
    Hostname { host: String, port: u16 },
}

impl NetworkAddress {
    /// Parses `s` as a literal IP (see [`SocketAddress::parse`]); if that
    /// yields an unspecified address and `s` wasn't itself the unspecified
    /// literal, the input is treated as a hostname instead. A trailing
    /// `:port` is stripped and assigned to the shadow port either way.
    pub fn parse(s: &str) -> Self {
        let literal = SocketAddress::parse(s);
        if !literal.is_any() {
            return NetworkAddress::Resolved(literal);
        }

        let (host, port) = split_host_port(s);
        if host.is_empty() {
            return NetworkAddress::Resolved(SocketAddress::port_only(port));
        }
        NetworkAddress::Hostname { host, port }
    }

    pub fn from_socket_address(addr: SocketAddress) -> Self {
        NetworkAddress::Resolved(addr)
    }

    pub fn port(&self) -> u16 {
        match self {
            NetworkAddress::Resolved(addr) => addr.port(),
            NetworkAddress::Hostname { port, .. } => *port,
        }
    }

    pub fn with_port(self, port: u16) -> Self {
        match self {
            NetworkAddress::Resolved(addr) => NetworkAddress::Resolved(addr.with_port(port)),
            NetworkAddress::Hostname { host, .. } => NetworkAddress::Hostname { host, port },
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, NetworkAddress::Resolved(_))
    }
}

/// Strips a trailing `:port` (bracketed-IPv6-aware) from `s`, returning the
/// remaining host text and the parsed port (0 if absent or invalid).
fn split_host_port(s: &str) -> (String, u16) {
    if let Some(rest) = s.strip_prefix('[')
        && let Some(close) = rest.find(']')
    {
        let host = &rest[..close];
        let tail = &rest[close + 1..];
        let port = tail.strip_prefix(':').and_then(|p| p.parse::<u16>().ok()).unwrap_or(0);
        return (host.to_string(), port);
    }

    match s.rsplit_once(':') {
        Some((host, port_str)) => {
            let port = port_str.parse::<u16>().ok();
            match port {
                Some(p) => (host.to_string(), p),
                None => (s.to_string(), 0),
            }
        }
        None => (s.to_string(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_ip_resolves_without_hostname() {
        let addr = NetworkAddress::parse("127.0.0.1:9000");
        assert!(addr.is_resolved());
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn non_literal_becomes_hostname_with_port_stripped() {
        let addr = NetworkAddress::parse("example.com:443");
        assert_eq!(addr, NetworkAddress::Hostname { host: "example.com".into(), port: 443 });
    }

    #[test]
    fn bracketed_hostname_like_syntax_still_strips_port() {
        // Not a literal IPv6 address, so this falls through to the
        // hostname branch, but brackets are still parsed for the port.
        let (host, port) = split_host_port("[localhost]:53");
        assert_eq!(host, "localhost");
        assert_eq!(port, 53);
    }
}
