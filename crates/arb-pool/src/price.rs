//! Exact rational prices and price <-> tick conversion.

use std::cmp::Ordering;

use alloy::primitives::U256;
use arb_math::tick_math::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO,
    MIN_TICK,
};
use arb_math::{biguint_to_u256, isqrt, u256_to_biguint};
use num_bigint::BigUint;

/// An exact price: `numerator / denominator` units of the quote token per
/// unit of the base token. Kept as an unreduced rational; comparisons
/// cross-multiply, so no precision is lost anywhere.
#[derive(Clone, Debug)]
pub struct Price {
    numerator: BigUint,
    denominator: BigUint,
}

impl Price {
    pub fn new(numerator: BigUint, denominator: BigUint) -> Self {
        assert!(denominator.bits() != 0, "price denominator is zero");
        Self {
            numerator,
            denominator,
        }
    }

    pub fn from_u256_ratio(numerator: U256, denominator: U256) -> Self {
        Self::new(u256_to_biguint(numerator), u256_to_biguint(denominator))
    }

    /// Price implied by a Q64.96 sqrt ratio: `sqrt^2 / 2^192`.
    pub fn from_sqrt_ratio_x96(sqrt_ratio_x96: U256) -> Self {
        let sqrt = u256_to_biguint(sqrt_ratio_x96);
        Self::new(&sqrt * &sqrt, BigUint::from(1u8) << 192usize)
    }

    pub fn numerator(&self) -> &BigUint {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigUint {
        &self.denominator
    }

    /// The reciprocal price, quoting base per quote.
    pub fn invert(&self) -> Price {
        Price::new(self.denominator.clone(), self.numerator.clone())
    }

    /// `floor(sqrt(numerator / denominator) * 2^96)`, clamped into the
    /// sqrt-ratio range the tick math can represent.
    pub fn to_sqrt_ratio_x96(&self) -> U256 {
        let root = isqrt(&((&self.numerator << 192usize) / &self.denominator));
        let min = u256_to_biguint(MIN_SQRT_RATIO);
        let max = u256_to_biguint(MAX_SQRT_RATIO) - 1u8;
        biguint_to_u256(&root.clamp(min, max))
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        &self.numerator * &other.denominator == &other.numerator * &self.denominator
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

/// Price of the base token at `tick`. Orientation matters: the raw
/// `sqrt^2 / 2^192` ratio quotes token0 in token1, so a token1 base reads
/// the reciprocal.
pub fn tick_to_price(tick: i32, base_is_token0: bool) -> Price {
    let price0 = Price::from_sqrt_ratio_x96(get_sqrt_ratio_at_tick(tick));
    if base_is_token0 {
        price0
    } else {
        price0.invert()
    }
}

/// Tick whose base-token price is closest to `price` from the zero side:
/// the greatest tick at or below it for a token0 base, the least tick for
/// a token1 base (where tick prices fall as the index grows).
pub fn price_to_closest_tick(price: &Price, base_is_token0: bool) -> i32 {
    let ratio = if base_is_token0 {
        price.to_sqrt_ratio_x96()
    } else {
        price.invert().to_sqrt_ratio_x96()
    };
    let mut tick = get_tick_at_sqrt_ratio(ratio);
    if tick < MAX_TICK {
        // isqrt floors, so a price sitting exactly on a tick boundary can
        // land one tick low; bump back up when the next tick still fits.
        let next = tick_to_price(tick + 1, base_is_token0);
        let still_fits = if base_is_token0 {
            *price >= next
        } else {
            *price <= next
        };
        if still_fits {
            tick += 1;
        }
    }
    tick
}

/// Nearest tick to `price` measured by exact base-token price distance.
///
/// Starts from `price_to_closest_tick` and also considers the tick one
/// spacing toward the swap direction, keeping whichever sits closer. The
/// equilibrium walk uses this to decide where its final price lands.
pub fn price_to_best_tick(
    price: &Price,
    base_is_token0: bool,
    tick_spacing: i32,
    zero_for_one: bool,
) -> i32 {
    let tick = price_to_closest_tick(price, base_is_token0);
    let neighbor = if zero_for_one {
        tick + tick_spacing
    } else {
        tick - tick_spacing
    };
    let neighbor = neighbor.clamp(MIN_TICK, MAX_TICK);
    let (neighbor_num, neighbor_den) = tick_price_distance(neighbor, price, base_is_token0);
    let (tick_num, tick_den) = tick_price_distance(tick, price, base_is_token0);
    if neighbor_num * tick_den < tick_num * neighbor_den {
        neighbor
    } else {
        tick
    }
}

/// `|price(tick) - price|` as an unreduced rational.
fn tick_price_distance(tick: i32, price: &Price, base_is_token0: bool) -> (BigUint, BigUint) {
    let sqrt = u256_to_biguint(get_sqrt_ratio_at_tick(tick));
    let ratio = &sqrt * &sqrt;
    let scale = BigUint::from(1u8) << 192usize;
    let (lhs, rhs, denominator) = if base_is_token0 {
        // price(tick) = ratio / 2^192
        (
            &ratio * price.denominator(),
            price.numerator() * &scale,
            price.denominator() * &scale,
        )
    } else {
        // price(tick) = 2^192 / ratio
        (
            &scale * price.denominator(),
            price.numerator() * &ratio,
            price.denominator() * &ratio,
        )
    };
    let numerator = if lhs >= rhs { lhs - rhs } else { rhs - lhs };
    (numerator, denominator)
}
