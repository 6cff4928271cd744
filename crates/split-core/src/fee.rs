//! # Platform Fee
//!
//! The platform keeps a fixed share of every destination charge as the
//! application fee; the rest is transferred to the connected account.

/// Share of each payment retained by the platform, in percent
pub const PLATFORM_FEE_PERCENT: i64 = 10;

/// Largest amount a single payment intent may carry (minor currency units)
pub const MAX_AMOUNT: i64 = 99_999_999;

/// Application fee for `amount` (minor currency units), rounded half up.
///
/// Integer arithmetic keeps 5 -> 1 and 15 -> 2 exact where `amount * 0.1`
/// would rely on float representation. `None` if the amount is too large
/// to compute a fee for.
pub fn application_fee(amount: i64) -> Option<i64> {
    amount
        .checked_mul(PLATFORM_FEE_PERCENT)?
        .checked_add(50)
        .map(|scaled| scaled.div_euclid(100))
}
