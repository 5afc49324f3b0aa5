//! Address model, stream/datagram sockets, name resolution, and interface
//! enumeration over the BSD-sockets surface (§4.5–4.6 of the design).
//!
//! No event loop or reactor is provided or assumed — callers drive sockets
//! directly in blocking mode, or poll them with their own `mio`/`epoll`/IOCP
//! layer in non-blocking mode (Non-goal: this crate doesn't pick one).

pub mod address;
pub mod datagram;
pub mod error;
pub mod interfaces;
pub mod network_address;
pub mod raw;
pub mod resolve;
pub mod socket;
pub mod stream;
pub mod tcp;
pub mod udp;

pub use address::SocketAddress;
pub use datagram::{Datagram, DatagramSocket};
pub use error::{Error, ResolveError, Result};
pub use interfaces::{Interface, InterfaceFamily, interfaces};
pub use network_address::NetworkAddress;
pub use raw::{Domain, Kind, Shutdown};
pub use resolve::resolve;
pub use socket::{SocketCore, SocketState};
pub use stream::StreamSocket;
pub use tcp::TcpListener;
