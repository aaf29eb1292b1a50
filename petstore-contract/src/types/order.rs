//! 注文型定義

use serde::{Deserialize, Serialize};

/// 注文状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// 注文済み
    #[default]
    Placed,
    /// 承認済み
    Approved,
    /// 配達済み
    Delivered,
}

impl OrderStatus {
    /// OrderStatusを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Approved => "approved",
            Self::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 注文
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// 注文ID
    pub id: i64,
    /// 対象ペットID
    pub pet_id: i64,
    /// 数量
    pub quantity: u32,
    /// Ship date as sent by the service, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<String>,
    /// 注文状態
    pub status: OrderStatus,
    /// 完了フラグ
    pub complete: bool,
}

impl Order {
    /// A placed, completed order for a single pet
    pub fn placed(id: i64, pet_id: i64) -> Self {
        Self {
            id,
            pet_id,
            quantity: 1,
            ship_date: None,
            status: OrderStatus::Placed,
            complete: true,
        }
    }
}
