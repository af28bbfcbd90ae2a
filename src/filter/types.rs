use serde_json::{Map, Value};

/// Documents are flat JSON objects keyed by field name.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterData {
    /// Field equality conditions; all must hold. Empty matches every document.
    pub where_clause: Map<String, Value>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Offset pagination window requested by a list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }
}
