use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration as StdDuration;

use libsniffer_tools::{Config, Error, Frame, FrameSource, InterfaceError, Timestamp};
use pcap::{Active, Capture, Linktype, Precision};
use tracing::{debug, trace, warn};

/// Capture options, read from the `live` section of the configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureOptions {
    pub promisc: bool,
    pub immediate: bool,
    pub snaplen: i32,
    pub precision: Precision,
    /// Polling interval in microseconds, while no frame is available
    pub sleep_interval: u64,
    pub kernel_filter: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        CaptureOptions {
            promisc: true,
            immediate: true,
            snaplen: 65535,
            precision: Precision::Micro,
            sleep_interval: 500,
            kernel_filter: true,
        }
    }
}

impl CaptureOptions {
    pub fn from_config(config: &Config) -> Result<Self, InterfaceError> {
        let default = CaptureOptions::default();
        let precision = match config.get("live.precision") {
            None | Some("micro") => Precision::Micro,
            Some("nano") => Precision::Nano,
            _ => return Err(InterfaceError::InvalidOption("live.precision")),
        };
        let snaplen = match config.get_usize("live.snaplen") {
            None => default.snaplen,
            Some(n) => i32::try_from(n)
                .ok()
                .filter(|&n| n > 0)
                .ok_or(InterfaceError::InvalidOption("live.snaplen"))?,
        };
        Ok(CaptureOptions {
            promisc: config.get_bool("live.promisc").unwrap_or(default.promisc),
            immediate: config.get_bool("live.immediate").unwrap_or(default.immediate),
            snaplen,
            precision,
            sleep_interval: config
                .get_usize("live.sleep")
                .map_or(default.sleep_interval, |n| n as u64),
            kernel_filter: config
                .get_bool("live.kernel_filter")
                .unwrap_or(default.kernel_filter),
        })
    }
}

/// libpcap reports missing privileges only through its error message
pub(crate) fn is_permission_error(msg: &str) -> bool {
    let msg = msg.to_ascii_lowercase();
    msg.contains("permission") || msg.contains("not permitted")
}

fn open_error(name: &str, e: pcap::Error) -> InterfaceError {
    match e {
        pcap::Error::PcapError(ref msg) if is_permission_error(msg) => {
            InterfaceError::PermissionDenied {
                name: name.to_owned(),
                reason: msg.clone(),
            }
        }
        e => InterfaceError::Open {
            name: name.to_owned(),
            reason: e.to_string(),
        },
    }
}

/// Names of the interfaces which can be opened for capture
pub fn list_interfaces() -> Result<Vec<String>, InterfaceError> {
    let devices = pcap::Device::list().map_err(|e| InterfaceError::List(e.to_string()))?;
    Ok(devices.into_iter().map(|dev| dev.name).collect())
}

/// Frame source reading from a live network interface
///
/// The handle is non-blocking: while no frame is available, the source
/// sleeps for `live.sleep` microseconds and checks the `running` flag.
pub struct LiveFrameSource {
    name: String,
    cap: Option<Capture<Active>>,
    precision: Precision,
    sleep_interval: u64,

    buffer: Vec<u8>,
    index: usize,
}

impl LiveFrameSource {
    /// Open `interface_name` for capture
    ///
    /// Only Ethernet interfaces are supported.
    pub fn open(interface_name: &str, options: &CaptureOptions) -> Result<Self, InterfaceError> {
        let interfaces =
            pcap::Device::list().map_err(|e| InterfaceError::List(e.to_string()))?;
        let dev = interfaces
            .into_iter()
            .find(|iface| iface.name == interface_name)
            .ok_or_else(|| InterfaceError::NotFound(interface_name.to_owned()))?;

        let cap = Capture::from_device(dev)
            .map_err(|e| open_error(interface_name, e))?
            .immediate_mode(options.immediate)
            .promisc(options.promisc)
            .snaplen(options.snaplen)
            .precision(options.precision);
        let cap = cap
            .open()
            .and_then(|cap| cap.setnonblock())
            .map_err(|e| open_error(interface_name, e))?;

        let link_type = cap.get_datalink();
        if link_type != Linktype::ETHERNET {
            return Err(InterfaceError::UnsupportedLinkType {
                name: interface_name.to_owned(),
                link_type: link_type.0,
            });
        }
        debug!(
            "Opened interface {} (promisc: {}, snaplen: {})",
            interface_name, options.promisc, options.snaplen
        );

        Ok(LiveFrameSource {
            name: interface_name.to_owned(),
            cap: Some(cap),
            precision: options.precision,
            sleep_interval: options.sleep_interval,
            buffer: Vec::with_capacity(options.snaplen as usize),
            index: 0,
        })
    }

    /// Install a kernel filter (libpcap syntax) on the handle
    pub fn set_filter(&mut self, expr: &str) -> Result<(), InterfaceError> {
        let cap = self
            .cap
            .as_mut()
            .ok_or(InterfaceError::InvalidOption("capture handle is closed"))?;
        cap.filter(expr, true)
            .map_err(|e| InterfaceError::Filter {
                name: self.name.clone(),
                filter: expr.to_owned(),
                reason: e.to_string(),
            })?;
        debug!("Installed kernel filter '{expr}' on {}", self.name);
        Ok(())
    }
}

impl FrameSource for LiveFrameSource {
    fn next_frame(&mut self, running: &AtomicBool) -> Result<Option<Frame<'_>>, Error> {
        let cap = match self.cap.as_mut() {
            Some(cap) => cap,
            None => return Err(Error::Generic("capture handle is closed")),
        };
        let (ts_sec, ts_frac, caplen, origlen) = loop {
            if !running.load(Ordering::SeqCst) {
                return Ok(None);
            }
            match cap.next_packet() {
                Ok(packet) => {
                    let header = packet.header;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(packet.data);
                    break (
                        header.ts.tv_sec as u32,
                        header.ts.tv_usec as u32,
                        header.caplen,
                        header.len,
                    );
                }
                Err(pcap::Error::TimeoutExpired) => {
                    thread::sleep(StdDuration::from_micros(self.sleep_interval));
                }
                Err(e) => {
                    warn!("Live mode: getting next packet failed: {e:?}");
                    return Err(Error::Capture(e.to_string()));
                }
            }
        };
        self.index += 1;
        let ts = match self.precision {
            Precision::Micro => Timestamp::new(ts_sec, ts_frac),
            Precision::Nano => Timestamp::from_nanos(ts_sec, ts_frac),
        };
        trace!("Live: received frame {} ({} bytes)", self.index, caplen);
        Ok(Some(Frame {
            ts,
            data: &self.buffer,
            caplen,
            origlen,
            index: self.index,
        }))
    }

    fn close(&mut self) {
        if self.cap.take().is_some() {
            debug!("Closed interface {}", self.name);
        }
    }
}
