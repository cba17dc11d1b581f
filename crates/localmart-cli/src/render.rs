// Plain-text rendering of the cart for stdout.

use localmart_cart::cart::state::Cart;
use localmart_cart::cart::totals::{CartTotals, Pricing};

/// Render every line plus totals.
pub fn cart(cart: &Cart, pricing: &Pricing) -> String {
    let Some(restaurant) = cart.restaurant() else {
        return "Your cart is empty.\n".to_string();
    };

    let mut out = format!("Cart from {} ({})\n", restaurant.name, restaurant.id);
    for line in cart.items() {
        let veg = if line.is_vegetarian { " [veg]" } else { "" };
        out.push_str(&format!(
            "  {:>3} x {}{} ({}) @ {} = {}\n",
            line.quantity,
            line.name,
            veg,
            line.id,
            pricing.format(line.price),
            pricing.format(line.line_total()),
        ));
    }
    out.push_str(&totals(&cart.totals(pricing), pricing));
    out
}

/// Render the four total rows.
pub fn totals(totals: &CartTotals, pricing: &Pricing) -> String {
    let rows = [
        ("Subtotal", totals.subtotal),
        ("Delivery fee", totals.delivery_fee),
        ("Taxes", totals.taxes),
        ("Total", totals.total),
    ];
    rows.iter()
        .map(|(label, amount)| format!("  {:<12} {:>12}\n", label, pricing.format(*amount)))
        .collect()
}
