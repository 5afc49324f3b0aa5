use std::io;

/// Failure opening a [`crate::writers::FileWriter`]'s backing file.
///
/// The writer-closed condition itself isn't modeled here: `send`/`close`
/// already report it through `bool`/`is_closed()` (see `DESIGN.md` for why
/// the narrow [`crate::MessageWriter`] protocol stays boolean rather than
/// `Result`-returning), so the one genuinely fallible boundary left in this
/// crate is opening the file a [`crate::writers::FileWriter`] writes to.
#[derive(Debug, thiserror::Error)]
pub enum FileWriterError {
    #[error(transparent)]
    Io(#[from] io::Error),
}
