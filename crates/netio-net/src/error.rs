use std::sync::Mutex;

/// Unifies the three error surfaces named in the specification: a
/// POSIX-style category mirroring `errno` (`std::io::Error` already does
/// this faithfully on every target we build for), a dedicated resolver
/// category, and the logic-error case ("wrong state for this call") that is
/// the only condition this crate turns into a panic rather than a `Result`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A POSIX (via `std::io::Error`/`errno`) or Windows (WSA/Win32, also
    /// surfaced through `std::io::Error` by the standard library on that
    /// target) condition.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Name resolution failed; see [`ResolveError`].
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The socket was not in a state that allows this call (e.g. `listen`
    /// on a socket that was never `bind`-ed).
    #[error("invalid operation for socket state: {0}")]
    InvalidState(&'static str),
}

impl Error {
    /// True for the one condition every blocking-mode I/O path recovers
    /// from locally: the OS reports "would block". Callers see this
    /// translated into a clean, error-free partial result rather than an
    /// `Err` — see `socket::{StreamSocket,DatagramSocket}` read/write paths.
    pub fn is_would_block(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::WouldBlock)
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::Interrupted)
    }
}

/// A dedicated category for `getaddrinfo`/`GetAddrInfo` failures. A POSIX
/// `EAI_SYSTEM` return is remapped by the resolver to
/// `std::io::Error::last_os_error()` and surfaced as [`ResolveError::System`]
/// instead — every other code stays in this category.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{}", gai_message(*.0))]
    Gai(i32),

    /// `EAI_SYSTEM`: the underlying OS error, not a resolver-specific code.
    #[error(transparent)]
    System(#[from] std::io::Error),
}

impl ResolveError {
    pub fn code(&self) -> Option<i32> {
        match self {
            ResolveError::Gai(code) => Some(*code),
            ResolveError::System(_) => None,
        }
    }
}

/// `gai_strerror` is not documented as thread-safe on every platform this
/// crate targets (older glibc, some BSDs), so every call to it is funneled
/// through one process-wide mutex, matching the spec's "global mutex when
/// the OS version is not thread-safe" requirement for the category's
/// `message(code)`.
static GAI_STRERROR_LOCK: Mutex<()> = Mutex::new(());

#[cfg(unix)]
fn gai_message(code: i32) -> String {
    let _guard = GAI_STRERROR_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    unsafe {
        let ptr = libc::gai_strerror(code);
        if ptr.is_null() {
            return format!("unknown getaddrinfo error {code}");
        }
        std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

#[cfg(windows)]
fn gai_message(code: i32) -> String {
    let _guard = GAI_STRERROR_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    format!("getaddrinfo error {code}")
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn would_block_is_recognized() {
        let err = Error::Io(std::io::Error::from(std::io::ErrorKind::WouldBlock));
        assert!(err.is_would_block());
        assert!(!err.is_interrupted());
    }

    #[test]
    fn invalid_state_is_not_would_block() {
        let err = Error::InvalidState("listen requires bound");
        assert!(!err.is_would_block());
    }
}
