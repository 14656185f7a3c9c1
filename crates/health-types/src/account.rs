use serde::{Deserialize, Serialize};

/// 组织内账号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationAccount {
    pub id: String,
    pub name: String,
}

impl OrganizationAccount {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
