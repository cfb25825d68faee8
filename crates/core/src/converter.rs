//! Crypto ⇄ fiat conversion at a given spot price.

/// Fiat value of `amount` units at `price_per_unit`.
pub fn crypto_to_fiat(amount: f64, price_per_unit: f64) -> f64 {
    amount * price_per_unit
}

/// Units purchasable for `amount` of fiat at `price_per_unit`.
/// Returns `None` when the price is zero or not finite.
pub fn fiat_to_crypto(amount: f64, price_per_unit: f64) -> Option<f64> {
    if price_per_unit == 0.0 || !price_per_unit.is_finite() {
        return None;
    }
    Some(amount / price_per_unit)
}
