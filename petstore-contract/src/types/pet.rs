//! ペット型定義

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// ペットの販売状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    /// 販売中
    #[default]
    Available,
    /// 取引中
    Pending,
    /// 売約済み
    Sold,
}

impl PetStatus {
    /// All statuses accepted by the service
    pub const ALL: [PetStatus; 3] = [PetStatus::Available, PetStatus::Pending, PetStatus::Sold];

    /// PetStatusを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
        }
    }
}

impl FromStr for PetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "sold" => Ok(Self::Sold),
            other => Err(format!("Unknown pet status: {other}")),
        }
    }
}

impl std::fmt::Display for PetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// カテゴリ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// カテゴリID
    pub id: i64,
    /// カテゴリ名
    pub name: String,
}

/// タグ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// タグID
    pub id: i64,
    /// タグ名
    pub name: String,
}

/// ペット
///
/// Optional collections are omitted when empty so that a minimal payload is
/// exactly `{id, name, status}` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Caller-assigned identifier
    pub id: i64,
    /// ペット名
    pub name: String,
    /// カテゴリ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// 写真URL一覧
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo_urls: Vec<String>,
    /// タグ一覧
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// 販売状態
    pub status: PetStatus,
}

impl Pet {
    /// Minimal pet: id, name and status only
    pub fn minimal(id: i64, name: impl Into<String>, status: PetStatus) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            photo_urls: Vec::new(),
            tags: Vec::new(),
            status,
        }
    }

    /// Set the category
    pub fn with_category(mut self, id: i64, name: impl Into<String>) -> Self {
        self.category = Some(Category {
            id,
            name: name.into(),
        });
        self
    }

    /// Append a photo URL
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_urls.push(url.into());
        self
    }

    /// Append a tag
    pub fn with_tag(mut self, id: i64, name: impl Into<String>) -> Self {
        self.tags.push(Tag {
            id,
            name: name.into(),
        });
        self
    }
}
