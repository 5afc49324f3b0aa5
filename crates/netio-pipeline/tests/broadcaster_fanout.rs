use std::sync::{Arc, Mutex};

use netio_buf::{ReadMode, WriteMode};
use netio_pipeline::{MessageBroadcaster, MessageQueue, MessageReaderWriter, MessageWriter, writers::SyncCallbackWriter};

#[test]
fn send_fans_out_a_clone_to_every_writer() {
    let broadcaster = MessageBroadcaster::new();
    let q1 = Arc::new(MessageQueue::<u32>::new(8));
    let q2 = Arc::new(MessageQueue::<u32>::new(8));
    broadcaster.add(q1.clone());
    broadcaster.add(q2.clone());

    let accepted = broadcaster.send(&7u32, WriteMode::Blocking);
    assert_eq!(accepted, 2);
    assert_eq!(q1.read(ReadMode::Immediate, false), Some(7));
    assert_eq!(q2.read(ReadMode::Immediate, false), Some(7));
}

#[test]
fn send_to_one_moves_into_first_accepting_writer() {
    let broadcaster = MessageBroadcaster::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let closed_writer: Arc<dyn MessageWriter<u32>> =
        Arc::new(SyncCallbackWriter::new(|_: &u32| panic!("closed writer must never be invoked")));
    closed_writer.close(false);

    let seen_clone = seen.clone();
    let open_writer: Arc<dyn MessageWriter<u32>> =
        Arc::new(SyncCallbackWriter::new(move |m: &u32| seen_clone.lock().unwrap().push(*m)));

    broadcaster.add(closed_writer);
    broadcaster.add(open_writer);

    let delivered = broadcaster.send_to_one(99u32, WriteMode::Blocking);
    assert!(delivered);
    assert_eq!(*seen.lock().unwrap(), vec![99]);
}
