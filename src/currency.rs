use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

// half-up, the usual convention for money amounts
fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert `amount` in `currency` into the base currency using a rate table
/// keyed by quote currency, where each rate is units of quote currency per one
/// unit of base. Returns None when the table has no rate for `currency`.
pub fn convert_to_base(
    amount: Decimal,
    currency: &str,
    base_currency: &str,
    rates: &HashMap<String, Decimal>,
) -> Option<Decimal> {
    if currency.eq_ignore_ascii_case(base_currency) {
        return Some(to_cents(amount));
    }
    let rate = rates.get(&currency.to_ascii_uppercase())?;
    if rate.is_zero() {
        return None;
    }
    Some(to_cents(amount / rate))
}
