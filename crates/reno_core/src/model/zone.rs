use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    /// Task ids in display order.
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tasks: Vec::new(),
        }
    }
}

/// Zones a fresh project starts with after `reset`.
pub const DEFAULT_ZONES: [(&str, &str); 4] = [
    ("landing", "Landing"),
    ("kitchen-living", "Kitchen/Living"),
    ("staircase", "Staircase"),
    ("kitchen", "Kitchen"),
];
