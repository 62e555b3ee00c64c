use std::io::Write;

use libsniffer::{FilterSpec, Reporter, Sniffer};
use libsniffer_tools::{CaptureEngine, Config, InterfaceError};
use tracing::debug;

mod live_source;

pub use live_source::{list_interfaces, CaptureOptions, LiveFrameSource};

/// Open `interface_name` and build a capture engine reporting to `reporter`
///
/// When `live.kernel_filter` is enabled, the filter is also installed on the
/// handle as a kernel prefilter.
pub fn create_engine_live<W: Write>(
    interface_name: &str,
    filter: FilterSpec,
    reporter: Reporter<W>,
    config: &Config,
) -> Result<CaptureEngine<LiveFrameSource, Sniffer<W>>, InterfaceError> {
    let options = CaptureOptions::from_config(config)?;
    let mut source = LiveFrameSource::open(interface_name, &options)?;
    if options.kernel_filter {
        if let Some(expr) = filter.to_bpf() {
            source.set_filter(&expr)?;
        }
    } else {
        debug!("kernel filter disabled");
    }
    let sniffer = Sniffer::new(filter, reporter);
    Ok(CaptureEngine::new(source, sniffer, config))
}
