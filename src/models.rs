use serde::{Deserialize, Serialize};

/// A tagged entry in the collection / 集合中的一条带标签记录
///
/// `url` and `code` are optional; absence is signalled by omitting the
/// key in the persisted JSON, never by `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Defaulted so a request body without tags reaches validation
    /// instead of failing at deserialization / 缺省为空以便进入校验
    #[serde(default)]
    pub tags: Vec<String>,
}
