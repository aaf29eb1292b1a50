//! 型定義
//!
//! Wire types of the pet-store REST surface.

/// ペット
pub mod pet;

/// 注文
pub mod order;

pub use order::{Order, OrderStatus};
pub use pet::{Category, Pet, PetStatus, Tag};

/// Inventory snapshot: status label to count
pub type Inventory = std::collections::BTreeMap<String, i64>;
