use crate::error::Error;
use crate::frame::Frame;
use std::sync::atomic::AtomicBool;

/// Outcome of handling one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The frame was accepted and reported
    Accept,
    /// The frame was dropped (undecodable, or filtered out)
    Drop,
}

/// Producer of raw frames, in arrival order
pub trait FrameSource {
    /// Wait for the next frame.
    ///
    /// Blocks until a frame arrives. Returns `Ok(None)` only once `running`
    /// has been cleared, which must be observed while waiting.
    fn next_frame(&mut self, running: &AtomicBool) -> Result<Option<Frame<'_>>, Error>;

    /// Release the underlying capture handle. Must be idempotent.
    fn close(&mut self) {}
}

/// Common trait for frame consumers
pub trait FrameHandler {
    /// Initialization function, called before the first frame (optional)
    fn init(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Callback function for every captured frame
    ///
    /// Errors are fatal for the capture; per-frame problems must be reported
    /// as `Verdict::Drop`.
    fn handle_frame(&mut self, frame: &Frame) -> Result<Verdict, Error>;

    /// Teardown function, called when the capture terminates (optional)
    fn teardown(&mut self) {}
}
