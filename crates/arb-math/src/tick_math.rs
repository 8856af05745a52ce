//! Tick index <-> sqrt-price conversion, ported from Uniswap V3 `TickMath.sol`.
//!
//! `get_sqrt_ratio_at_tick` multiplies out precomputed Q128.128 factors of
//! `sqrt(1.0001)^(2^i)` for each set bit of the tick; `get_tick_at_sqrt_ratio`
//! inverts it with an MSB scan plus a fixed-point base-2 logarithm. Both are
//! bit-exact against the reference contract, which the equilibrium walk
//! depends on: a tick that is off by one shifts every downstream amount.

use alloy::primitives::U256;
use num_bigint::{BigInt, Sign};

/// Lowest usable tick index.
pub const MIN_TICK: i32 = -887272;
/// Highest usable tick index.
pub const MAX_TICK: i32 = 887272;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// `get_sqrt_ratio_at_tick(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([0x5D95_1D52_6398_8D26, 0xEFD1_FC6A_5064_8849, 0xFFFD_8963, 0]);

/// Q128.128 factors `2^128 / sqrt(1.0001)^(2^i)` for tick bits 0..=19,
/// stored as `(low_limb, high_limb)` pairs.
const TICK_FACTORS: [(u64, u64); 20] = [
    (0xAA2D_162D_1A59_4001, 0xFFFC_B933_BD6F_AD37),
    (0x59A4_6990_580E_213A, 0xFFF9_7272_373D_4132),
    (0xEF12_357C_F3C7_FDCC, 0xFFF2_E50F_5F65_6932),
    (0x1C36_24EA_A094_1CD0, 0xFFE5_CACA_7E10_E4E6),
    (0xC9DB_5883_5C92_6644, 0xFFCB_9843_D60F_6159),
    (0x472E_6896_DFB2_54C0, 0xFF97_3B41_FA98_C081),
    (0x43EC_78B3_26B5_2861, 0xFF2E_A164_66C9_6A38),
    (0x11C4_61F1_969C_3053, 0xFE5D_EE04_6A99_A2A8),
    (0xDCFF_C83B_479A_A3A4, 0xFCBE_86C7_900A_88AE),
    (0x6F2B_074C_F781_5E54, 0xF987_A725_3AC4_1317),
    (0x940C_7A39_8E4B_70F3, 0xF339_2B08_22B7_0005),
    (0x43B2_9C7F_A6E8_89D9, 0xE715_9475_A2C2_9B74),
    (0x845A_D8F7_92AA_5825, 0xD097_F3BD_FD20_22B8),
    (0x8A65_DC1F_90E0_61E5, 0xA9F7_4646_2D87_0FDF),
    (0x90BB_3DF6_2BAF_32F7, 0x70D8_69A1_56D2_A1B8),
    (0x8123_1505_542F_CFA6, 0x31BE_135F_97D0_8FD9),
    (0xC677_DE54_F3E9_9BC9, 0x09AA_508B_5B7A_84E1),
    (0x6699_C329_225E_E604, 0x005D_6AF8_DEDB_8119),
    (0x1EA9_2604_1BED_FE98, 0x0000_2216_E584_F5FA),
    (0x91F7_DC42_444E_8FA2, 0x0000_0000_048A_1703),
];

/// `255738958999603826347141`, i.e. `2^128 / log_2(sqrt(1.0001))` in Q128.
const LOG_SQRT_10001_MULTIPLIER: u128 = 255738958999603826347141;
const TICK_LOW_ERROR_MARGIN: u128 = 3402992956809132418596140100660247210;
const TICK_HIGH_ERROR_MARGIN: u128 = 291339464771989622907027621153398088495;

/// Returns `sqrt(1.0001^tick) * 2^96` as a Q64.96 value.
///
/// # Panics
/// Panics when `tick` is outside `[MIN_TICK, MAX_TICK]`; callers clamp
/// before converting.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> U256 {
    let abs_tick = tick.unsigned_abs();
    assert!(abs_tick <= MAX_TICK as u32, "tick out of range: {tick}");

    let mut ratio = if abs_tick & 1 != 0 {
        let (lo, hi) = TICK_FACTORS[0];
        U256::from_limbs([lo, hi, 0, 0])
    } else {
        U256::from(1u8) << 128
    };
    for (bit, (lo, hi)) in TICK_FACTORS.iter().enumerate().skip(1) {
        if abs_tick & (1u32 << bit) != 0 {
            // ratio stays <= 2^128, so the product fits in 256 bits.
            ratio = (ratio * U256::from_limbs([*lo, *hi, 0, 0])) >> 128;
        }
    }
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so the result round-trips through
    // get_tick_at_sqrt_ratio.
    let shifted = ratio >> 32;
    if ratio & U256::from(0xFFFF_FFFFu64) != U256::ZERO {
        shifted + U256::from(1u8)
    } else {
        shifted
    }
}

/// Returns the largest tick whose sqrt ratio is at most `sqrt_price_x96`.
///
/// # Panics
/// Panics when the price is outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> i32 {
    assert!(
        sqrt_price_x96 >= MIN_SQRT_RATIO && sqrt_price_x96 < MAX_SQRT_RATIO,
        "sqrt price out of range"
    );

    let ratio = sqrt_price_x96 << 32;

    let mut r = ratio;
    let mut msb = 0u32;
    for shift in [128u32, 64, 32, 16, 8, 4, 2, 1] {
        if r >= U256::from(1u8) << shift {
            r >>= shift as usize;
            msb |= shift;
        }
    }

    r = if msb >= 128 {
        ratio >> ((msb - 127) as usize)
    } else {
        ratio << ((127 - msb) as usize)
    };

    let mut log_2: i128 = ((msb as i128) - 128) << 64;
    for shift in (50..=63u32).rev() {
        r = (r * r) >> 127;
        let f = U256::to::<u64>(&(r >> 128usize));
        log_2 |= (f as i128) << shift;
        r >>= f as usize;
    }

    // The final fixed-point multiply needs ~150 bits; done in BigInt with
    // arithmetic (floor) shifts, matching the int256 reference math.
    let log_sqrt10001 = BigInt::from(log_2) * BigInt::from(LOG_SQRT_10001_MULTIPLIER);
    let tick_low = bigint_shr_to_i32(&(&log_sqrt10001 - BigInt::from(TICK_LOW_ERROR_MARGIN)));
    let tick_high = bigint_shr_to_i32(&(&log_sqrt10001 + BigInt::from(TICK_HIGH_ERROR_MARGIN)));

    if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high) <= sqrt_price_x96 {
        tick_high
    } else {
        tick_low
    }
}

fn bigint_shr_to_i32(value: &BigInt) -> i32 {
    let shifted: BigInt = value >> 128usize;
    let (sign, digits) = shifted.to_u64_digits();
    let magnitude = digits.first().copied().unwrap_or(0) as i64;
    let signed = if sign == Sign::Minus { -magnitude } else { magnitude };
    signed as i32
}
