use serde::{Deserialize, Serialize};

/// A suggested product from the backend's recommendation endpoint.
/// Fetched once per session; never invalidated client-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
}
