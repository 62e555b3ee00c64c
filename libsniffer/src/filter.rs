use std::collections::BTreeSet;

use thiserror::Error;

use crate::layers::ProtocolKind;
use crate::record::PacketRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("a port filter requires TCP or UDP to be selected (use -t/--tcp or -u/--udp)")]
    PortWithoutTransport,
    #[error("invalid port mode '{0}' (expected either|both)")]
    InvalidPortMode(String),
}

/// Which port(s) of a record a port filter is compared with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortDirection {
    Source,
    Destination,
    Either,
    Both,
}

impl PortDirection {
    /// Parse the `filter.port_mode` configuration value
    pub fn of_string(s: &str) -> Result<PortDirection, FilterError> {
        match s {
            "either" => Ok(PortDirection::Either),
            "both" => Ok(PortDirection::Both),
            _ => Err(FilterError::InvalidPortMode(s.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortFilter {
    pub port: u16,
    pub direction: PortDirection,
}

impl PortFilter {
    pub fn new(port: u16, direction: PortDirection) -> Self {
        PortFilter { port, direction }
    }

    pub fn matches(&self, src_port: u16, dst_port: u16) -> bool {
        match self.direction {
            PortDirection::Source => src_port == self.port,
            PortDirection::Destination => dst_port == self.port,
            PortDirection::Either => src_port == self.port || dst_port == self.port,
            PortDirection::Both => src_port == self.port && dst_port == self.port,
        }
    }
}

/// Record selection, built once from the command line
///
/// An empty protocol set selects every protocol; all port filters must match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSpec {
    protocols: BTreeSet<ProtocolKind>,
    ports: Vec<PortFilter>,
}

impl FilterSpec {
    pub fn new<I>(protocols: I, ports: Vec<PortFilter>) -> Result<FilterSpec, FilterError>
    where
        I: IntoIterator<Item = ProtocolKind>,
    {
        let protocols: BTreeSet<_> = protocols.into_iter().collect();
        if !ports.is_empty() && !protocols.iter().any(|p| p.has_ports()) {
            return Err(FilterError::PortWithoutTransport);
        }
        Ok(FilterSpec { protocols, ports })
    }

    /// A filter letting every record through
    pub fn accept_all() -> FilterSpec {
        FilterSpec::default()
    }

    pub fn protocols(&self) -> &BTreeSet<ProtocolKind> {
        &self.protocols
    }

    pub fn ports(&self) -> &[PortFilter] {
        &self.ports
    }

    pub fn is_accept_all(&self) -> bool {
        self.protocols.is_empty() && self.ports.is_empty()
    }

    pub fn matches(&self, record: &PacketRecord) -> bool {
        self.protocol_matches(record) && self.port_matches(record)
    }

    fn protocol_matches(&self, record: &PacketRecord) -> bool {
        if self.protocols.is_empty() {
            return true;
        }
        match record.kind() {
            Some(kind) => self.protocols.contains(&kind),
            None => false,
        }
    }

    fn port_matches(&self, record: &PacketRecord) -> bool {
        if self.ports.is_empty() {
            return true;
        }
        match record.ports() {
            Some((src, dst)) => self.ports.iter().all(|p| p.matches(src, dst)),
            None => false,
        }
    }
}

/// Test if `record` is selected by `spec`
#[inline]
pub fn matches(record: &PacketRecord, spec: &FilterSpec) -> bool {
    spec.matches(record)
}
