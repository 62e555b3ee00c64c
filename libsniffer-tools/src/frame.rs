use crate::timestamp::Timestamp;

/// One captured link-layer frame, borrowed from the frame source
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Capture timestamp
    pub ts: Timestamp,
    /// Captured bytes, starting with the link-layer header
    pub data: &'a [u8],
    /// Number of bytes captured
    pub caplen: u32,
    /// Length of the frame on the wire
    pub origlen: u32,
    /// Index of the frame in the capture, starting at 1
    pub index: usize,
}

impl Frame<'_> {
    /// Returns true if the frame was cut by the capture snapshot length
    pub fn is_truncated(&self) -> bool {
        self.caplen < self.origlen
    }
}
