use std::{fs::File, io::BufWriter, path::Path};

use netio_buf::WriteMode;

use crate::{
    error::FileWriterError,
    writer::MessageWriter,
    writers::stream::{StreamWriter, SyncStreamWriter},
};

/// A stream writer whose sink is an owned file. Synchronous and asynchronous
/// variants mirror [`SyncStreamWriter`]/[`StreamWriter`] exactly — a file is
/// simply the stream type.
pub enum FileWriter<M: 'static> {
    Sync(SyncStreamWriter<M, BufWriter<File>>),
    Async(StreamWriter<M>),
}

impl<M> FileWriter<M>
where
    M: Default + Clone + Send + Sync + 'static,
{
    pub fn open_sync<F>(
        path: impl AsRef<Path>,
        write: F,
        flush_on_send: bool,
    ) -> Result<Self, FileWriterError>
    where
        F: Fn(&mut BufWriter<File>, &M) -> std::io::Result<()> + Send + Sync + 'static,
    {
        let file = File::create(path)?;
        Ok(Self::Sync(SyncStreamWriter::new(BufWriter::new(file), write, flush_on_send)))
    }

    pub fn open_async<F>(
        path: impl AsRef<Path>,
        limit: usize,
        write: F,
        flush_on_send: bool,
    ) -> Result<Self, FileWriterError>
    where
        F: Fn(&mut BufWriter<File>, &M) -> std::io::Result<()> + Send + 'static,
    {
        let file = File::create(path)?;
        Ok(Self::Async(StreamWriter::new(limit, BufWriter::new(file), write, flush_on_send)))
    }
}

impl<M> MessageWriter<M> for FileWriter<M>
where
    M: Default + Clone + Send + Sync + 'static,
{
    fn send(&self, m: M, mode: WriteMode) -> bool {
        match self {
            FileWriter::Sync(w) => w.send(m, mode),
            FileWriter::Async(w) => w.send(m, mode),
        }
    }

    fn close(&self, cancel_pending: bool) {
        match self {
            FileWriter::Sync(w) => w.close(cancel_pending),
            FileWriter::Async(w) => w.close(cancel_pending),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            FileWriter::Sync(w) => w.is_closed(),
            FileWriter::Async(w) => w.is_closed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn sync_file_writer_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let writer: FileWriter<i32> =
            FileWriter::open_sync(&path, |w, m: &i32| writeln!(w, "{m}"), true).unwrap();
        writer.send(1, WriteMode::Immediate);
        writer.send(2, WriteMode::Immediate);
        writer.close(false);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "1\n2\n");
    }
}
