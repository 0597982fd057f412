use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cart line as reported by the backend. The client never mutates
/// these; `price` is the unit price, row totals are derived at render time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

/// The complete cart as last read from the backend. Always replaced
/// wholesale after a successful scan, never patched locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSnapshot {
    #[serde(default)]
    pub products: Vec<CartItem>,
    #[serde(default)]
    pub total_price: f64,
    #[serde(skip, default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            total_price: 0.0,
            fetched_at: Utc::now(),
        }
    }
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
