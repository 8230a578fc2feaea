use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyAction {
    Collected,
    Transferred,
    Received,
    Analyzed,
    Archived,
}

impl CustodyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustodyAction::Collected => "collected",
            CustodyAction::Transferred => "transferred",
            CustodyAction::Received => "received",
            CustodyAction::Analyzed => "analyzed",
            CustodyAction::Archived => "archived",
        }
    }
}

impl fmt::Display for CustodyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for CustodyAction {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "collected" => Ok(CustodyAction::Collected),
            "transferred" => Ok(CustodyAction::Transferred),
            "received" => Ok(CustodyAction::Received),
            "analyzed" => Ok(CustodyAction::Analyzed),
            "archived" => Ok(CustodyAction::Archived),
            other => Err(format!("Unknown custody action: {other}")),
        }
    }
}
