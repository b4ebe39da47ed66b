use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a running service instance, served from `/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub instance_id: Uuid,
    /// Optional capabilities switched on by configuration, e.g. `transcription`.
    pub features: Vec<String>,
}

impl ServiceInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            instance_id: Uuid::new_v4(),
            features: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: &str) -> Self {
        if !self.features.iter().any(|f| f == feature) {
            self.features.push(feature.to_owned());
        }
        self
    }
}
