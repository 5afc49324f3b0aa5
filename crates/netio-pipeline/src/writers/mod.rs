//! Concrete [`crate::MessageWriter`] implementations.
//!
//! [`crate::MessageQueue`] itself is the "buffer writer" named in the
//! specification; the remaining strategies live here as small, composable
//! wrappers rather than subclasses of a common base.

mod async_callback;
mod file;
mod stream;
mod sync_callback;

pub use async_callback::AsyncCallbackWriter;
pub use file::FileWriter;
pub use stream::{StreamWriter, SyncStreamWriter};
pub use sync_callback::SyncCallbackWriter;
