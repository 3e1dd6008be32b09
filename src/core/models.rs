use serde::{Deserialize, Serialize};

/// A network device model tracked by the registry, together with its
/// end-of-sale / end-of-life metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub eos_date: Option<String>,
    pub eol_date: Option<String>,
    pub life_status: Option<String>,
    pub notes: String,
    pub photo: Option<String>,
    pub approval_state: ApprovalState,
    pub created_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    Pending,
    Published,
}

impl ApprovalState {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "published" => Some(Self::Published),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Published => "published",
        }
    }
}

/// The acting caller, as resolved by the upstream authentication layer.
/// The registry trusts this value; it never authenticates itself.
#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
    pub is_admin: bool,
}
