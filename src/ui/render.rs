use crate::domain::cart::CartSnapshot;
use crate::domain::recommendation::Recommendation;

/// Text rendering of the cart table. Row price is unit price times quantity;
/// the total comes from the backend snapshot, not from re-summing rows.
pub fn render_cart(snapshot: &CartSnapshot, currency: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Your Cart{:>width$}\n",
        format!("{currency}{:.2}", snapshot.total_price),
        width = 43
    ));
    out.push_str(&format!("{:<28}{:>6}{:>18}\n", "Item", "Qty", "Price"));
    out.push_str(&"-".repeat(52));
    out.push('\n');

    if snapshot.is_empty() {
        out.push_str("Cart is empty. Scan products to begin!\n");
        return out;
    }

    for item in &snapshot.products {
        let row_total = item.price * item.quantity as f64;
        out.push_str(&format!(
            "{:<28}{:>6}{:>18}\n",
            item.name,
            item.quantity,
            format!("{currency}{row_total:.2}")
        ));
    }

    out
}

pub fn render_recommendations(recommendations: &[Recommendation], currency: &str) -> String {
    if recommendations.is_empty() {
        return String::new();
    }

    let mut out = String::from("You might also like\n");
    for rec in recommendations {
        out.push_str(&format!("  {}  {currency}{:.2}\n", rec.name, rec.price));
    }
    out
}
