/// Health state reported by a node component.
///
/// The discriminants are the gauge values exported for status metrics, so
/// `0` always means healthy.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeStatus {
    Ok = 0,
    Down = 1,
    Failing = 2,
    Lagging = 3,
    Info = 4,
    Unknown = 5,
}

impl NodeStatus {
    /// Normalizes a textual status. Total: anything unrecognised is
    /// [`NodeStatus::Unknown`].
    pub fn parse(status: &str) -> Self {
        match status {
            "ok" => NodeStatus::Ok,
            "down" => NodeStatus::Down,
            "failing" => NodeStatus::Failing,
            "lagging" => NodeStatus::Lagging,
            "info" => NodeStatus::Info,
            _ => NodeStatus::Unknown,
        }
    }

    /// Ordinal code exported as the gauge value.
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn is_ok(self) -> bool {
        self == NodeStatus::Ok
    }
}

impl From<&str> for NodeStatus {
    fn from(status: &str) -> Self {
        NodeStatus::parse(status)
    }
}

/// Maps a status string straight to its exported code.
pub fn status_code(status: &str) -> i64 {
    NodeStatus::parse(status).code()
}
