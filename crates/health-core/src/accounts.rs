use crate::api::OrganizationsApi;
use crate::error::Result;
use crate::pagination::collect_items;
use health_types::OrganizationAccount;
use std::collections::HashMap;
use tracing::info;

/// 账号 ID 到显示名称的只读映射
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    names: HashMap<String, String>,
}

impl AccountDirectory {
    /// 完整遍历组织账号列表一次
    pub async fn build(api: &dyn OrganizationsApi) -> Result<Self> {
        let accounts = collect_items(|token| api.list_accounts(token)).await?;
        let directory = Self::from_accounts(accounts);
        info!(accounts = directory.len(), "Account directory built");
        Ok(directory)
    }

    pub fn from_accounts(accounts: impl IntoIterator<Item = OrganizationAccount>) -> Self {
        Self {
            names: accounts.into_iter().map(|a| (a.id, a.name)).collect(),
        }
    }

    /// 未知账号原样返回 ID
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn display_names(&self, ids: &[String]) -> Vec<String> {
        ids.iter().map(|id| self.display_name(id).to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
