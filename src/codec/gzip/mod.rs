use crate::codec::Status;

mod decoder;
mod encoder;
mod header;

pub use self::{decoder::GzipDecoder, encoder::GzipEncoder};

/// Collapse "paused" statuses: a call that moved bytes is `Ok`, one that did not is `BufError`.
fn settle(status: Status, progressed: bool) -> Status {
    match status {
        Status::Ok | Status::BufError if progressed => Status::Ok,
        Status::Ok | Status::BufError => Status::BufError,
        other => other,
    }
}
