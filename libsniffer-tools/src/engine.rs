use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Error;
use crate::handler::{FrameHandler, FrameSource, Verdict};

/// State of a capture engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Running,
    Terminated,
}

/// Counters for a finished capture
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    /// Frames received from the source
    pub frames: usize,
    /// Frames accepted by the handler
    pub accepted: usize,
    /// Frames dropped by the handler
    pub dropped: usize,
}

/// Live capture engine
///
/// `CaptureEngine` pulls frames from a `FrameSource` (which must already be
/// open, so the engine starts in the `Running` state) and hands each of them
/// to a `FrameHandler`, in arrival order, until the `running` flag is cleared
/// or `max_packets` frames have been accepted.
///
/// Whatever the reason for stopping, the handler is torn down and the source
/// is closed before `run` returns.
///
/// ## example
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use libsniffer_tools::*;
///
/// struct OneFrame(Option<Vec<u8>>);
///
/// impl FrameSource for OneFrame {
///     fn next_frame(&mut self, running: &AtomicBool) -> Result<Option<Frame<'_>>, Error> {
///         match self.0 {
///             Some(ref data) => Ok(Some(Frame {
///                 ts: Timestamp::default(),
///                 data,
///                 caplen: data.len() as u32,
///                 origlen: data.len() as u32,
///                 index: 1,
///             })),
///             None => {
///                 running.store(false, Ordering::SeqCst);
///                 Ok(None)
///             }
///         }
///     }
///
///     fn close(&mut self) {
///         self.0 = None;
///     }
/// }
///
/// struct Count(usize);
///
/// impl FrameHandler for Count {
///     fn handle_frame(&mut self, _frame: &Frame) -> Result<Verdict, Error> {
///         self.0 += 1;
///         Ok(Verdict::Accept)
///     }
/// }
///
/// let mut config = Config::default();
/// config.set("max_packets", 1);
/// let mut engine = CaptureEngine::new(OneFrame(Some(vec![0; 14])), Count(0), &config);
/// let summary = engine.run(Arc::new(AtomicBool::new(true))).unwrap();
/// assert_eq!(summary.accepted, 1);
/// assert_eq!(engine.state(), CaptureState::Terminated);
/// ```
pub struct CaptureEngine<S: FrameSource, H: FrameHandler> {
    source: S,
    handler: H,

    max_packets: Option<usize>,
    state: CaptureState,
    summary: CaptureSummary,
}

impl<S: FrameSource, H: FrameHandler> CaptureEngine<S, H> {
    /// Build a new engine over an opened source.
    ///
    /// `max_packets` is read from the configuration; 0 or absent means no limit.
    pub fn new(source: S, handler: H, config: &Config) -> Self {
        let max_packets = config.get_usize("max_packets").filter(|&n| n > 0);
        CaptureEngine {
            source,
            handler,
            max_packets,
            state: CaptureState::Running,
            summary: CaptureSummary::default(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn max_packets(&self) -> Option<usize> {
        self.max_packets
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Main function: capture until cancelled or until the packet budget is spent
    ///
    /// Clearing `running` (from a signal handler, or another thread) stops
    /// the capture, even while waiting for a frame.
    pub fn run(&mut self, running: Arc<AtomicBool>) -> Result<CaptureSummary, Error> {
        if self.state == CaptureState::Terminated {
            return Err(Error::Generic("capture already terminated"));
        }
        debug!("Live mode: waiting for frames");
        let result = self
            .handler
            .init()
            .and_then(|_| self.capture_loop(&running));

        self.handler.teardown();
        self.source.close();
        self.state = CaptureState::Terminated;
        debug!(
            "Capture terminated: {} frames, {} accepted, {} dropped",
            self.summary.frames, self.summary.accepted, self.summary.dropped
        );

        result.map(|_| self.summary)
    }

    fn capture_loop(&mut self, running: &AtomicBool) -> Result<(), Error> {
        while let Some(frame) = self.source.next_frame(running)? {
            self.summary.frames += 1;
            trace!(
                "frame {} (caplen {}, len {}) at {}",
                frame.index,
                frame.caplen,
                frame.origlen,
                frame.ts
            );
            match self.handler.handle_frame(&frame)? {
                Verdict::Accept => self.summary.accepted += 1,
                Verdict::Drop => self.summary.dropped += 1,
            }
            if let Some(max) = self.max_packets {
                if self.summary.accepted >= max {
                    debug!("Reached maximum number of packets ({max})");
                    break;
                }
            }
        }
        if !running.load(Ordering::SeqCst) {
            debug!("Capture cancelled");
        }
        Ok(())
    }
}
