pub mod render;

pub use render::{render_cart, render_recommendations};
