use std::{
    fmt,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    str::FromStr,
};

/// The address family `SocketAddress` is tagged with. `Unspecified` carries
/// no bytes of its own but can still carry a port via the shadow described
/// below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Family {
    Unspecified,
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

/// A family-tagged address value: unspecified, IPv4, or IPv6, plus a *port
/// shadow* that is tracked independently of the family so an otherwise
/// unspecified address can still carry a port hint for later resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SocketAddress {
    family: Family,
    port: u16,
}

impl Default for SocketAddress {
    fn default() -> Self {
        Self::unspecified()
    }
}

impl SocketAddress {
    pub fn unspecified() -> Self {
        Self { family: Family::Unspecified, port: 0 }
    }

    pub fn port_only(port: u16) -> Self {
        Self { family: Family::Unspecified, port }
    }

    pub fn from_ipv4(addr: Ipv4Addr, port: u16) -> Self {
        Self { family: Family::V4(addr), port }
    }

    pub fn from_ipv6(addr: Ipv6Addr, port: u16) -> Self {
        Self { family: Family::V6(addr), port }
    }

    /// Constructs from a raw IPv4 address in host byte order plus a port.
    pub fn from_ipv4_u32(addr: u32, port: u16) -> Self {
        Self::from_ipv4(Ipv4Addr::from(addr), port)
    }

    pub fn from_std(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(a) => Self::from_ipv4(*a.ip(), a.port()),
            SocketAddr::V6(a) => Self::from_ipv6(*a.ip(), a.port()),
        }
    }

    /// Parses `a.b.c.d[:port]`, `[v6]:port`, or bare `v6`. Never fails: an
    /// address that can't be recognized as IPv4 or IPv6, or a port suffix
    /// that is non-numeric, empty, or out of `u16` range, yields an
    /// unspecified address (carrying no port).
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('[') {
            return Self::parse_bracketed_v6(rest);
        }

        // Bare IPv6 literal (no brackets, no port is possible to disambiguate
        // from the address's own colons).
        if let Ok(v6) = s.parse::<Ipv6Addr>() {
            return Self::from_ipv6(v6, 0);
        }

        // `a.b.c.d` or `a.b.c.d:port`.
        match s.rsplit_once(':') {
            Some((host, port_str)) => match (host.parse::<Ipv4Addr>(), parse_port(port_str)) {
                (Ok(addr), Some(port)) => Self::from_ipv4(addr, port),
                _ => Self::unspecified(),
            },
            None => match s.parse::<Ipv4Addr>() {
                Ok(addr) => Self::from_ipv4(addr, 0),
                Err(_) => Self::unspecified(),
            },
        }
    }

    fn parse_bracketed_v6(rest: &str) -> Self {
        let Some(close) = rest.find(']') else {
            return Self::unspecified();
        };
        let (addr_str, tail) = rest.split_at(close);
        let Ok(addr) = addr_str.parse::<Ipv6Addr>() else {
            return Self::unspecified();
        };
        // `tail` is `]` (bare `[addr]`) or `]:port`.
        let after_bracket = &tail[1..];
        if after_bracket.is_empty() {
            return Self::from_ipv6(addr, 0);
        }
        let Some(port_str) = after_bracket.strip_prefix(':') else {
            return Self::unspecified();
        };
        match parse_port(port_str) {
            Some(port) => Self::from_ipv6(addr, port),
            None => Self::unspecified(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn set_port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    /// The port shadow, or `default` if it is zero.
    pub fn get_port(&self, default: u16) -> u16 {
        if self.port == 0 { default } else { self.port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self.family, Family::V4(_))
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self.family, Family::V6(_))
    }

    /// True for the `Unspecified` family tag, or for the all-zeros address
    /// of either concrete family (`0.0.0.0` / `::`).
    pub fn is_any(&self) -> bool {
        match self.family {
            Family::Unspecified => true,
            Family::V4(addr) => addr.is_unspecified(),
            Family::V6(addr) => addr.is_unspecified(),
        }
    }

    /// IPv4-only: true for the limited broadcast address `255.255.255.255`.
    pub fn is_broadcast(&self) -> bool {
        matches!(self.family, Family::V4(addr) if addr.is_broadcast())
    }

    pub fn is_loopback(&self) -> bool {
        match self.family {
            Family::Unspecified => false,
            Family::V4(addr) => addr.is_loopback(),
            Family::V6(addr) => addr.is_loopback(),
        }
    }

    /// `None` for `Unspecified` (there is no OS-level address to hand the
    /// socket layer without a concrete family).
    pub fn to_std(self) -> Option<SocketAddr> {
        match self.family {
            Family::Unspecified => None,
            Family::V4(addr) => Some(SocketAddr::new(addr.into(), self.port)),
            Family::V6(addr) => Some(SocketAddr::new(addr.into(), self.port)),
        }
    }
}

fn parse_port(s: &str) -> Option<u16> {
    if s.is_empty() {
        return None;
    }
    s.parse::<u16>().ok().filter(|&p| p != 0 || s == "0")
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.family {
            Family::Unspecified => write!(f, "0.0.0.0"),
            Family::V4(addr) => {
                if self.port == 0 { write!(f, "{addr}") } else { write!(f, "{addr}:{}", self.port) }
            }
            Family::V6(addr) => {
                if self.port == 0 { write!(f, "{addr}") } else { write!(f, "[{addr}]:{}", self.port) }
            }
        }
    }
}

impl FromStr for SocketAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for SocketAddress {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<SocketAddr> for SocketAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::from_std(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv6_round_trips_with_brackets() {
        let addr = SocketAddress::parse("[::1]:443");
        assert_eq!(addr.to_string(), "[::1]:443");
        assert_eq!(addr.port(), 443);
        assert!(addr.is_loopback());
    }

    #[test]
    fn ipv4_with_port_parses() {
        let addr = SocketAddress::parse("192.168.1.1:22");
        assert_eq!(addr.port(), 22);
        assert!(addr.is_ipv4());
    }

    #[test]
    fn invalid_port_yields_unspecified() {
        let addr = SocketAddress::parse("bad:port");
        assert!(addr.is_any());
        assert_eq!(addr.port(), 0);
    }

    #[test]
    fn bare_ipv4_has_no_port() {
        let addr = SocketAddress::parse("10.0.0.1");
        assert_eq!(addr.port(), 0);
        assert_eq!(addr.to_string(), "10.0.0.1");
    }

    #[test]
    fn get_port_falls_back_to_default_when_unset() {
        let addr = SocketAddress::port_only(0);
        assert_eq!(addr.get_port(8080), 8080);
        assert_eq!(addr.with_port(1234).get_port(8080), 1234);
    }

    #[test]
    fn broadcast_is_ipv4_only() {
        assert!(SocketAddress::parse("255.255.255.255").is_broadcast());
        assert!(!SocketAddress::parse("[ff02::1]").is_broadcast());
    }

    #[test]
    fn port_shadow_survives_on_unspecified_address() {
        let addr = SocketAddress::unspecified().with_port(9000);
        assert!(addr.is_any());
        assert_eq!(addr.port(), 9000);
    }
}
