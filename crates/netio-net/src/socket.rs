//! Socket lifecycle state machine shared by [`crate::stream::StreamSocket`]
//! and [`crate::datagram::DatagramSocket`] (REDESIGN FLAGS item 1: a
//! capability trait, [`SocketCore`], rather than a C++-style base class).

use tracing::{debug, trace};

use crate::{
    address::SocketAddress,
    error::Error,
    network_address::NetworkAddress,
    raw::{Domain, Kind, RawSocket, Shutdown},
    resolve,
};

/// Where a socket sits in its lifecycle. The full client path is
/// `Invalid -> LookingUpHost -> Connecting -> Connected`; the server path is
/// `Invalid -> Bound -> Listening`. Either terminates via
/// `Disconnecting -> Invalid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocketState {
    Invalid,
    LookingUpHost,
    Bound,
    Connecting,
    Connected,
    Listening,
    Disconnecting,
}

/// Resolves the OS address family a descriptor must be created with.
/// Unspecified addresses carry no family and can't be bound or connected to
/// directly — they only ever appear as a listening `bind` wildcard paired
/// with an explicit [`Domain`] elsewhere, or as a parse failure.
pub(crate) fn domain_of(addr: &SocketAddress) -> Result<Domain, Error> {
    if addr.is_ipv6() {
        Ok(Domain::Inet6)
    } else if addr.is_ipv4() {
        Ok(Domain::Inet)
    } else {
        Err(Error::InvalidState("address has no concrete family to bind or connect with"))
    }
}

/// The fields every socket variant carries: the descriptor guard (absent
/// while `Invalid`), the lifecycle state, the desired blocking mode (applied
/// to the descriptor immediately, and remembered so it's reapplied to any
/// descriptor created later), and the transport kind used to create one.
pub struct SocketBase {
    raw: Option<RawSocket>,
    state: SocketState,
    blocking: bool,
    kind: Kind,
}

impl SocketBase {
    pub fn new(kind: Kind) -> Self {
        Self { raw: None, state: SocketState::Invalid, blocking: true, kind }
    }

    pub fn state(&self) -> SocketState {
        self.state
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Wraps an already-connected/accepted descriptor directly into
    /// `Connected`, skipping the bind/connect dance — this is how a TCP
    /// listener's accept loop produces its per-connection sockets (the
    /// "listening factory" from spec §4.6).
    pub fn from_accepted(raw: RawSocket, blocking: bool, kind: Kind) -> Result<Self, Error> {
        raw.set_blocking(blocking)?;
        Ok(Self { raw: Some(raw), state: SocketState::Connected, blocking, kind })
    }

    fn create_if_needed(&mut self, domain: Domain) -> Result<(), Error> {
        if self.raw.is_some() {
            return Ok(());
        }
        let raw = RawSocket::create(domain, self.kind)?;
        raw.set_blocking(self.blocking)?;
        self.raw = Some(raw);
        Ok(())
    }

    /// Public wrapper used by [`crate::datagram::DatagramSocket`], which
    /// needs a descriptor before `bind`/`connect_sync` for connectionless
    /// `sendto`/`recvfrom` calls.
    pub(crate) fn ensure_created(&mut self, domain: Domain) -> Result<(), Error> {
        self.create_if_needed(domain)
    }

    pub(crate) fn raw(&self) -> Result<&RawSocket, Error> {
        self.raw.as_ref().ok_or(Error::InvalidState("socket has no descriptor"))
    }
}

/// The lifecycle capability surface, implemented once here via default
/// methods and composed into [`crate::stream::StreamSocket`] /
/// [`crate::datagram::DatagramSocket`] through their `base`/`base_mut`
/// accessors, instead of the inheritance chain the source uses.
pub trait SocketCore {
    fn base(&self) -> &SocketBase;
    fn base_mut(&mut self) -> &mut SocketBase;

    /// Invoked after a successful synchronous connect.
    fn on_connected(&mut self) {}

    /// Invoked after `disconnect()` while the socket is in blocking mode
    /// (spec §4.6: "in blocking mode, invoke the disconnected hook").
    fn on_disconnected(&mut self) {}

    fn state(&self) -> SocketState {
        self.base().state
    }

    fn is_blocking(&self) -> bool {
        self.base().blocking
    }

    /// Applies immediately if a descriptor exists; always remembered for the
    /// next descriptor this socket creates.
    fn set_blocking(&mut self, blocking: bool) -> Result<(), Error> {
        let base = self.base_mut();
        base.blocking = blocking;
        if let Some(raw) = &base.raw {
            raw.set_blocking(blocking)?;
        }
        Ok(())
    }

    /// Creates a descriptor (if `Invalid`), sets `SO_REUSEADDR`, binds, and
    /// transitions to `Bound`. Fails without side effects if already bound
    /// or connected.
    fn bind(&mut self, addr: SocketAddress) -> Result<(), Error> {
        let base = self.base_mut();
        if base.state != SocketState::Invalid {
            return Err(Error::InvalidState("bind requires an invalid socket"));
        }
        let domain = domain_of(&addr)?;
        base.create_if_needed(domain)?;
        let raw = base.raw()?;
        raw.set_reuseaddr();
        let std_addr = addr.to_std().ok_or(Error::InvalidState("address has no concrete family"))?;
        raw.bind(std_addr)?;
        base.state = SocketState::Bound;
        trace!(addr = %addr, "socket bound");
        Ok(())
    }

    /// Tries each candidate in order, returning the first success. Used with
    /// the output of [`resolve::resolve`].
    fn bind_candidates(&mut self, candidates: &[SocketAddress]) -> Result<(), Error> {
        let mut last_err = Error::InvalidState("no bind candidates supplied");
        for candidate in candidates {
            match self.bind(*candidate) {
                Ok(()) => return Ok(()),
                Err(err) => last_err = err,
            }
        }
        Err(last_err)
    }

    /// Creates a descriptor if needed and connects, transitioning to
    /// `Connected` on success and invoking [`SocketCore::on_connected`]. If a
    /// descriptor had to be created for this call and the connect fails, it
    /// is closed (the socket returns to `Invalid`, not left half-formed).
    fn connect_sync(&mut self, addr: SocketAddress) -> Result<(), Error> {
        let base = self.base_mut();
        if base.state != SocketState::Invalid && base.state != SocketState::Bound {
            return Err(Error::InvalidState("connect requires an invalid or bound socket"));
        }
        let created_now = base.raw.is_none();
        let domain = domain_of(&addr)?;
        base.create_if_needed(domain)?;

        let std_addr = addr.to_std().ok_or(Error::InvalidState("address has no concrete family"))?;
        base.state = SocketState::Connecting;
        let result = base.raw().and_then(|raw| raw.connect(std_addr));

        match result {
            Ok(()) => {
                self.base_mut().state = SocketState::Connected;
                debug!(addr = %addr, "socket connected");
                self.on_connected();
                Ok(())
            }
            Err(err) => {
                let base = self.base_mut();
                if created_now {
                    base.raw = None;
                }
                base.state = SocketState::Invalid;
                Err(err)
            }
        }
    }

    fn connect_candidates(&mut self, candidates: &[SocketAddress]) -> Result<(), Error> {
        let mut last_err = Error::InvalidState("no connect candidates supplied");
        for candidate in candidates {
            match self.connect_sync(*candidate) {
                Ok(()) => return Ok(()),
                Err(err) => last_err = err,
            }
        }
        Err(last_err)
    }

    /// Resolves `target` (if it's a hostname, passing through
    /// `LookingUpHost`) and connects to the first reachable candidate.
    fn connect_network(&mut self, target: &NetworkAddress) -> Result<(), Error> {
        let candidates = match target {
            NetworkAddress::Resolved(addr) => vec![*addr],
            NetworkAddress::Hostname { host, port } => {
                self.base_mut().state = SocketState::LookingUpHost;
                resolve::resolve(host, *port, self.base().kind).map_err(Error::Resolve)?
            }
        };
        self.connect_candidates(&candidates)
    }

    /// Allowed only from `Bound`; transitions to `Listening`.
    fn listen(&mut self, backlog: i32) -> Result<(), Error> {
        let base = self.base_mut();
        if base.state != SocketState::Bound {
            return Err(Error::InvalidState("listen requires a bound socket"));
        }
        base.raw()?.listen(backlog)?;
        base.state = SocketState::Listening;
        Ok(())
    }

    /// Allowed in `Connected`, `Bound`, or `Listening`.
    fn shutdown(&mut self, how: Shutdown) -> Result<(), Error> {
        let base = self.base();
        if !matches!(base.state, SocketState::Connected | SocketState::Bound | SocketState::Listening) {
            return Err(Error::InvalidState("shutdown requires a connected, bound, or listening socket"));
        }
        base.raw()?.shutdown(how)
    }

    /// Closes the descriptor and returns to `Invalid`. Safe to call
    /// concurrently with other socket API calls on the same socket — those
    /// simply observe the descriptor gone and fail, per spec §5. Invokes
    /// [`SocketCore::on_disconnected`] when the socket was in blocking mode.
    fn disconnect(&mut self) {
        let base = self.base_mut();
        if base.state == SocketState::Invalid {
            return;
        }
        let was_blocking = base.blocking;
        base.state = SocketState::Disconnecting;
        base.raw = None;
        base.state = SocketState::Invalid;
        if was_blocking {
            self.on_disconnected();
        }
    }

    fn local_addr(&self) -> Result<SocketAddress, Error> {
        Ok(SocketAddress::from_std(self.base().raw()?.local_addr()?))
    }

    fn peer_addr(&self) -> Result<SocketAddress, Error> {
        Ok(SocketAddress::from_std(self.base().raw()?.peer_addr()?))
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    struct TestSocket {
        base: SocketBase,
        connected_hooks: usize,
        disconnected_hooks: usize,
    }

    impl TestSocket {
        fn new(kind: Kind) -> Self {
            Self { base: SocketBase::new(kind), connected_hooks: 0, disconnected_hooks: 0 }
        }
    }

    impl SocketCore for TestSocket {
        fn base(&self) -> &SocketBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut SocketBase {
            &mut self.base
        }

        fn on_connected(&mut self) {
            self.connected_hooks += 1;
        }

        fn on_disconnected(&mut self) {
            self.disconnected_hooks += 1;
        }
    }

    #[test]
    fn bind_listen_transitions_and_rejects_relisten() {
        let mut sock = TestSocket::new(Kind::Stream);
        sock.bind(SocketAddress::from_ipv4(Ipv4Addr::LOCALHOST, 0)).unwrap();
        assert_eq!(sock.state(), SocketState::Bound);
        sock.listen(8).unwrap();
        assert_eq!(sock.state(), SocketState::Listening);
        assert!(sock.listen(8).is_err());
    }

    #[test]
    fn connect_sync_runs_hook_and_updates_state() {
        let mut listener = TestSocket::new(Kind::Stream);
        listener.bind(SocketAddress::from_ipv4(Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.listen(8).unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = TestSocket::new(Kind::Stream);
        client.connect_sync(addr).unwrap();
        assert_eq!(client.state(), SocketState::Connected);
        assert_eq!(client.connected_hooks, 1);
    }

    #[test]
    fn disconnect_invokes_hook_only_when_blocking() {
        let mut sock = TestSocket::new(Kind::Datagram);
        sock.bind(SocketAddress::from_ipv4(Ipv4Addr::LOCALHOST, 0)).unwrap();
        sock.disconnect();
        assert_eq!(sock.state(), SocketState::Invalid);
        assert_eq!(sock.disconnected_hooks, 1);

        let mut non_blocking = TestSocket::new(Kind::Datagram);
        non_blocking.set_blocking(false).unwrap();
        non_blocking.bind(SocketAddress::from_ipv4(Ipv4Addr::LOCALHOST, 0)).unwrap();
        non_blocking.disconnect();
        assert_eq!(non_blocking.disconnected_hooks, 0);
    }
}
