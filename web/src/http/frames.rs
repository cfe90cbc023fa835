//! Re-segmentation of a message for a transport that reserves one byte as its
//! frame delimiter.
//!
//! A message containing `k` delimiters becomes exactly `k + 1` frames, none
//! of which contains the delimiter. Joining the frames with the delimiter
//! restores the message byte for byte.

use futures_util::{Sink, SinkExt};

/// The line transport delimits frames with `\n`.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Iterator over the frames of a message, in order.
#[derive(Clone, Debug)]
pub struct Frames<'a> {
    rest: Option<&'a str>,
    delimiter: u8,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        match memchr::memchr(self.delimiter, rest.as_bytes()) {
            Some(pos) => {
                self.rest = Some(&rest[pos + 1..]);
                Some(&rest[..pos])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

/// Splits `message` at every `delimiter`. The delimiter must be ASCII so that
/// every split lands on a char boundary.
pub fn split(message: &str, delimiter: u8) -> Frames<'_> {
    assert!(delimiter.is_ascii(), "frame delimiter must be ascii");

    Frames {
        rest: Some(message),
        delimiter,
    }
}

pub fn frames(message: &str) -> Frames<'_> {
    split(message, FRAME_DELIMITER)
}

/// Sends every frame of `message` through `sink`, strictly in order, and
/// flushes once the last one is queued. Returns the number of frames sent.
pub async fn send_frames<'a, S>(sink: &mut S, message: &'a str) -> Result<usize, S::Error>
where
    S: Sink<&'a str> + Unpin,
{
    let mut sent = 0;
    for frame in frames(message) {
        sink.feed(frame).await?;
        sent += 1;
    }
    sink.flush().await?;

    Ok(sent)
}
