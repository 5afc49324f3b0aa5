extern crate self as netio;

pub use netio_buf as buf;
pub use netio_net as net;
pub use netio_pipeline as pipeline;
pub use netio_utils as utils;
