use serde::Serialize;

/// Which workbook a row or value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Left,
    Right,
}

/// Short caller-supplied names for the two workbooks (e.g. `v1.0`, `v1.1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Labels {
    pub left: String,
    pub right: String,
}

impl Labels {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn get(&self, origin: Origin) -> &str {
        match origin {
            Origin::Left => &self.left,
            Origin::Right => &self.right,
        }
    }

    /// Classification tag for a row found on one side only: `"<label> only"`.
    pub fn only(&self, origin: Origin) -> String {
        format!("{} only", self.get(origin))
    }
}
