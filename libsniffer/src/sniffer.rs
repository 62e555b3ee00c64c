use std::io::Write;

use libsniffer_tools::{Error, Frame, FrameHandler, Verdict};

use crate::decoder::decode_frame;
use crate::filter::FilterSpec;
use crate::report::Reporter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnifferStats {
    pub frames: usize,
    pub decode_errors: usize,
    pub filtered: usize,
    pub reported: usize,
}

/// Frame handler: decode, filter, then report
///
/// Frames which cannot be decoded are counted and dropped. A failure to
/// write the report is fatal.
pub struct Sniffer<W: Write> {
    filter: FilterSpec,
    reporter: Reporter<W>,
    stats: SnifferStats,
}

impl<W: Write> Sniffer<W> {
    pub fn new(filter: FilterSpec, reporter: Reporter<W>) -> Self {
        Sniffer {
            filter,
            reporter,
            stats: SnifferStats::default(),
        }
    }

    pub fn stats(&self) -> SnifferStats {
        self.stats
    }

    pub fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }
}

impl<W: Write> FrameHandler for Sniffer<W> {
    fn init(&mut self) -> Result<(), Error> {
        match self.filter.to_bpf() {
            Some(expr) => debug!("Sniffer: filter is '{expr}'"),
            None => debug!("Sniffer: no filter"),
        }
        Ok(())
    }

    fn handle_frame(&mut self, frame: &Frame) -> Result<Verdict, Error> {
        self.stats.frames += 1;
        if frame.is_truncated() {
            trace!(
                "frame {}: captured {} of {} bytes",
                frame.index,
                frame.caplen,
                frame.origlen
            );
        }
        let record = match decode_frame(frame) {
            Ok(record) => record,
            Err(e) => {
                debug!("frame {}: {}", frame.index, e);
                self.stats.decode_errors += 1;
                return Ok(Verdict::Drop);
            }
        };
        if !self.filter.matches(&record) {
            self.stats.filtered += 1;
            return Ok(Verdict::Drop);
        }
        self.reporter.report(&record, frame.data)?;
        self.stats.reported += 1;
        Ok(Verdict::Accept)
    }

    fn teardown(&mut self) {
        let s = &self.stats;
        info!(
            "Sniffer: {} frames, {} reported, {} filtered out, {} decoding errors",
            s.frames, s.reported, s.filtered, s.decode_errors
        );
    }
}
