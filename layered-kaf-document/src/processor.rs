//! Provenance records of the tools that produced each layer.

use serde::{Deserialize, Serialize};

/// `yyyy-MM-dd'T'HH:mm:ssZ`, in the local zone.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// The current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn local_hostname() -> Option<String> {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.trim().is_empty() {
            return Some(name.trim().to_string());
        }
    }
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// One tool run over one layer.
///
/// Two processors are equal when their layer, name and version agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinguisticProcessor {
    pub layer: String,
    pub name: String,
    pub version: Option<String>,
    pub timestamp: Option<String>,
    pub begin_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
    pub hostname: Option<String>,
}

impl PartialEq for LinguisticProcessor {
    fn eq(&self, other: &Self) -> bool {
        self.layer == other.layer && self.name == other.name && self.version == other.version
    }
}

impl Eq for LinguisticProcessor {}

impl LinguisticProcessor {
    pub fn new(layer: impl Into<String>, name: impl Into<String>) -> Self {
        LinguisticProcessor {
            layer: layer.into(),
            name: name.into(),
            version: None,
            timestamp: None,
            begin_timestamp: None,
            end_timestamp: None,
            hostname: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets `timestamp` to now.
    pub fn stamp(&mut self) {
        self.timestamp = Some(timestamp());
    }

    /// Sets `begin_timestamp` to now.
    pub fn stamp_begin(&mut self) {
        self.begin_timestamp = Some(timestamp());
    }

    /// Sets `end_timestamp` to now.
    pub fn stamp_end(&mut self) {
        self.end_timestamp = Some(timestamp());
    }

    /// Fills in the host name of this machine unless one is set. Returns
    /// whether a host name is set afterwards.
    pub fn record_hostname(&mut self) -> bool {
        if self.hostname.is_none() {
            self.hostname = local_hostname();
        }
        self.hostname.is_some()
    }
}

/// Processors grouped by layer name. Layers keep the order in which they were
/// first seen, processors the order in which they were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinguisticProcessors {
    layers: Vec<(String, Vec<LinguisticProcessor>)>,
}

impl LinguisticProcessors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `processor` to its layer's list.
    pub fn add(&mut self, processor: LinguisticProcessor) -> &mut LinguisticProcessor {
        let at = match self.layers.iter().position(|(layer, _)| *layer == processor.layer) {
            Some(at) => at,
            None => {
                self.layers.push((processor.layer.clone(), Vec::new()));
                self.layers.len() - 1
            }
        };
        let list = &mut self.layers[at].1;
        list.push(processor);
        let last = list.len() - 1;
        &mut list[last]
    }

    /// Copies every processor of `other`, keeping layer order.
    pub fn extend_from(&mut self, other: &LinguisticProcessors) {
        for processor in other.iter() {
            self.add(processor.clone());
        }
    }

    /// Processors of `layer`, in insertion order.
    pub fn get(&self, layer: &str) -> &[LinguisticProcessor] {
        self.layers
            .iter()
            .find(|(name, _)| name == layer)
            .map(|(_, list)| list.as_slice())
            .unwrap_or(&[])
    }

    /// Layer names, in order of first appearance.
    pub fn layers(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|(layer, _)| layer.as_str())
    }

    /// Every processor, layer by layer.
    pub fn iter(&self) -> impl Iterator<Item = &LinguisticProcessor> {
        self.layers.iter().flat_map(|(_, list)| list.iter())
    }

    /// Whether `layer` has a processor called `name` with exactly `version`
    /// (`None` only matches processors without a version).
    pub fn exists(&self, layer: &str, name: &str, version: Option<&str>) -> bool {
        self.get(layer)
            .iter()
            .any(|p| p.name == name && p.version.as_deref() == version)
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
