pub mod cart;
pub mod recommendation;
pub mod scan;
