//! Software realization: bit-accurate IEEE-754 single-precision
//! multiply, fused multiply-add, and int32 conversion.
//!
//! Pure integer arithmetic, `core`-only, round-to-nearest-even. NaN and
//! exception semantics follow the RISC-V F extension: every NaN result
//! is the canonical quiet NaN `0x7FC0_0000`, invalid is raised for sNaN
//! operands, inf × 0, and inf − inf, and tininess is detected after
//! rounding. For every input these functions produce the same bits the
//! hardware realization produces, which is what lets a native hook
//! stand in for an instruction-level emulation of the same loop.
//!
//! Alignment works on `u128` fixed-point values instead of the split
//! 32/64-bit shift-and-jam routines a C soft-float library uses; once
//! the two terms are more than 64 bits apart the smaller one collapses
//! to a sticky bit, which cannot change the rounded result.

use super::fflags;
use super::Float32Ops;

const SIGN_MASK: u32 = 0x8000_0000;
const EXP_MASK: u32 = 0x7F80_0000;
const MANT_MASK: u32 = 0x007F_FFFF;
const QUIET_BIT: u32 = 0x0040_0000;

/// Canonical quiet NaN (RISC-V: the only NaN ever produced).
pub const CANONICAL_NAN: u32 = 0x7FC0_0000;

#[inline(always)]
fn is_nan(u: u32) -> bool {
    u & EXP_MASK == EXP_MASK && u & MANT_MASK != 0
}

#[inline(always)]
fn is_snan(u: u32) -> bool {
    is_nan(u) && u & QUIET_BIT == 0
}

#[inline(always)]
fn is_inf(u: u32) -> bool {
    u & !SIGN_MASK == EXP_MASK
}

#[inline(always)]
fn is_zero(u: u32) -> bool {
    u & !SIGN_MASK == 0
}

/// Decompose a finite nonzero f32 into `(sig, e)` with
/// `value = sig * 2^e` and `sig` normalized to `[2^23, 2^24)`.
/// Subnormals are renormalized by shifting into the hidden-bit slot.
#[inline(always)]
fn norm_sig(bits: u32) -> (u32, i32) {
    let exp = ((bits >> 23) & 0xFF) as i32;
    let frac = bits & MANT_MASK;
    if exp == 0 {
        let shift = frac.leading_zeros() - 8;
        (frac << shift, -149 - shift as i32)
    } else {
        (frac | (1 << 23), exp - 150)
    }
}

/// Round `sign * sig * 2^exp` (sig != 0, exact) to the nearest f32,
/// ties to even, setting NX/UF/OF as appropriate.
///
/// `sign` is already a sign-bit mask (0 or `SIGN_MASK`).
fn round_pack(sign: u32, exp: i32, sig: u128, flags: &mut u32) -> u32 {
    let nb = 128 - sig.leading_zeros() as i32;
    // Biased exponent of the leading bit.
    let mut exp_b = exp + nb - 1 + 127;

    // Reduce to 26 significant bits: 24 result bits + round + sticky.
    let shift = nb - 26;
    let mut sticky_low = false;
    let mut sig26: u64 = if shift > 0 {
        sticky_low = sig & ((1u128 << shift) - 1) != 0;
        (sig >> shift) as u64
    } else {
        (sig << (-shift) as u32) as u64
    };

    let subnormal = exp_b < 1;
    if subnormal {
        // Shift further right so the kept bits align to 2^-149.
        let extra = (1 - exp_b) as u32;
        if extra >= 26 {
            sticky_low |= sig26 != 0;
            sig26 = 0;
        } else {
            sticky_low |= sig26 & ((1u64 << extra) - 1) != 0;
            sig26 >>= extra;
        }
    }

    let round_bit = (sig26 >> 1) & 1 == 1;
    let sticky = sig26 & 1 == 1 || sticky_low;
    let inexact = round_bit || sticky;
    let mut kept = (sig26 >> 2) as u32;
    if round_bit && (sticky || kept & 1 == 1) {
        kept += 1;
    }

    if subnormal {
        // kept <= 2^23; exactly 2^23 means it rounded up to the
        // smallest normal, in which case the result is not tiny.
        if inexact {
            *flags |= fflags::NX;
            if kept < 1 << 23 {
                *flags |= fflags::UF;
            }
        }
        return sign | kept;
    }

    if kept == 1 << 24 {
        kept >>= 1;
        exp_b += 1;
    }
    if exp_b >= 0xFF {
        *flags |= fflags::OF | fflags::NX;
        return sign | EXP_MASK;
    }
    if inexact {
        *flags |= fflags::NX;
    }
    sign | ((exp_b as u32) << 23) | (kept & MANT_MASK)
}

/// Software `a * b`, round-to-nearest-even.
pub fn mul(a: f32, b: f32, flags: &mut u32) -> f32 {
    let ua = a.to_bits();
    let ub = b.to_bits();
    let sign = (ua ^ ub) & SIGN_MASK;

    if ua & EXP_MASK == EXP_MASK || ub & EXP_MASK == EXP_MASK {
        if is_snan(ua) || is_snan(ub) {
            *flags |= fflags::NV;
            return f32::from_bits(CANONICAL_NAN);
        }
        if is_nan(ua) || is_nan(ub) {
            return f32::from_bits(CANONICAL_NAN);
        }
        if (is_inf(ua) && is_zero(ub)) || (is_inf(ub) && is_zero(ua)) {
            *flags |= fflags::NV;
            return f32::from_bits(CANONICAL_NAN);
        }
        return f32::from_bits(sign | EXP_MASK);
    }
    if is_zero(ua) || is_zero(ub) {
        return f32::from_bits(sign);
    }

    let (sa, ea) = norm_sig(ua);
    let (sb, eb) = norm_sig(ub);
    // 24 x 24 -> 48 bits, exact.
    let psig = sa as u64 * sb as u64;
    f32::from_bits(round_pack(sign, ea + eb, psig as u128, flags))
}

/// Software fused `a * b + c` with a single rounding step.
pub fn fma(a: f32, b: f32, c: f32, flags: &mut u32) -> f32 {
    let ua = a.to_bits();
    let ub = b.to_bits();
    let uc = c.to_bits();
    let sp = (ua ^ ub) & SIGN_MASK;
    let sc = uc & SIGN_MASK;

    // Invalid even when the addend is a quiet NaN (RISC-V rule).
    let inf_times_zero =
        (is_inf(ua) && is_zero(ub)) || (is_inf(ub) && is_zero(ua));

    if is_nan(ua) || is_nan(ub) || is_nan(uc) {
        if is_snan(ua) || is_snan(ub) || is_snan(uc) || inf_times_zero {
            *flags |= fflags::NV;
        }
        return f32::from_bits(CANONICAL_NAN);
    }
    if inf_times_zero {
        *flags |= fflags::NV;
        return f32::from_bits(CANONICAL_NAN);
    }
    if is_inf(ua) || is_inf(ub) {
        if is_inf(uc) && sc != sp {
            *flags |= fflags::NV;
            return f32::from_bits(CANONICAL_NAN);
        }
        return f32::from_bits(sp | EXP_MASK);
    }
    if is_inf(uc) {
        return f32::from_bits(uc);
    }
    if is_zero(ua) || is_zero(ub) {
        if is_zero(uc) {
            // (+/-0) + (+/-0): like signs keep the sign, unlike signs
            // give +0 under round-to-nearest.
            return f32::from_bits(if sc == sp { uc } else { 0 });
        }
        return f32::from_bits(uc);
    }

    let (sa, ea) = norm_sig(ua);
    let (sb, eb) = norm_sig(ub);
    let psig = sa as u64 * sb as u64;
    let pe = ea + eb;
    if is_zero(uc) {
        return f32::from_bits(round_pack(sp, pe, psig as u128, flags));
    }
    let (csig, ce) = norm_sig(uc);

    // Bring product and addend onto a common scale. Beyond 64 bits of
    // exponent separation the smaller term is pure sticky.
    let diff = pe - ce;
    let (big_p, big_c, base): (u128, u128, i32) = if diff >= 0 {
        if diff <= 64 {
            ((psig as u128) << diff, csig as u128, ce)
        } else {
            ((psig as u128) << 26, 1, pe - 26)
        }
    } else {
        let d = (-diff) as u32;
        if d <= 64 {
            (psig as u128, (csig as u128) << d, pe)
        } else {
            (1, (csig as u128) << 26, ce - 26)
        }
    };

    let (rsign, mag) = if sp == sc {
        (sp, big_p + big_c)
    } else if big_p >= big_c {
        (sp, big_p - big_c)
    } else {
        (sc, big_c - big_p)
    };
    if mag == 0 {
        // Exact cancellation: +0 under round-to-nearest.
        return 0.0;
    }
    f32::from_bits(round_pack(rsign, base, mag, flags))
}

/// Software int32 → f32 conversion, round-to-nearest-even.
pub fn i32_to_f32(x: i32, flags: &mut u32) -> f32 {
    if x == 0 {
        return 0.0;
    }
    let sign = if x < 0 { SIGN_MASK } else { 0 };
    f32::from_bits(round_pack(sign, 0, x.unsigned_abs() as u128, flags))
}

/// Emulated single-precision float ops.
#[derive(Debug, Clone, Copy)]
pub struct SoftFloat;

impl Float32Ops for SoftFloat {
    #[inline(always)]
    fn mul(a: f32, b: f32) -> f32 {
        let mut f = 0;
        mul(a, b, &mut f)
    }

    #[inline(always)]
    fn fma(a: f32, b: f32, c: f32) -> f32 {
        let mut f = 0;
        fma(a, b, c, &mut f)
    }

    #[inline(always)]
    fn from_i32(x: i32) -> f32 {
        let mut f = 0;
        i32_to_f32(x, &mut f)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fflags;
    use super::*;

    fn mul_bits(a: f32, b: f32) -> (u32, u32) {
        let mut f = 0;
        let r = mul(a, b, &mut f);
        (r.to_bits(), f)
    }

    fn fma_bits(a: f32, b: f32, c: f32) -> (u32, u32) {
        let mut f = 0;
        let r = fma(a, b, c, &mut f);
        (r.to_bits(), f)
    }

    #[test]
    fn mul_exact_values() {
        assert_eq!(mul_bits(1.5, 2.0), (3.0f32.to_bits(), 0));
        assert_eq!(mul_bits(-0.5, 0.25), ((-0.125f32).to_bits(), 0));
        assert_eq!(mul_bits(0.0, -3.0), ((-0.0f32).to_bits(), 0));
        assert_eq!(mul_bits(-0.0, -3.0), (0.0f32.to_bits(), 0));
    }

    #[test]
    fn mul_rounds_to_nearest_even() {
        // (1 + 2^-23)^2 = 1 + 2^-22 + 2^-46; the tail rounds away.
        let a = f32::from_bits(0x3F80_0001);
        let (bits, f) = mul_bits(a, a);
        assert_eq!(bits, 0x3F80_0002);
        assert_eq!(f, fflags::NX);
    }

    #[test]
    fn mul_overflow_and_underflow() {
        let (bits, f) = mul_bits(f32::MAX, 2.0);
        assert_eq!(bits, f32::INFINITY.to_bits());
        assert_eq!(f & fflags::OF, fflags::OF);

        // MIN_POSITIVE * 0.25 is an exact subnormal: no flags.
        let (bits, f) = mul_bits(f32::MIN_POSITIVE, 0.25);
        assert_eq!(f32::from_bits(bits), f32::MIN_POSITIVE / 4.0);
        assert_eq!(f, 0);

        // Deep underflow to zero is inexact and tiny.
        let (bits, f) = mul_bits(f32::MIN_POSITIVE, 1e-30);
        assert_eq!(bits, 0);
        assert_eq!(f, fflags::UF | fflags::NX);
    }

    #[test]
    fn mul_subnormal_operands() {
        let tiny = f32::from_bits(1); // smallest subnormal
        assert_eq!(mul_bits(tiny, 1.0), (1, 0));
        let (bits, _) = mul_bits(tiny, 0.5);
        assert_eq!(bits, 0); // 2^-150 ties to even -> 0
    }

    #[test]
    fn mul_nan_and_inf() {
        assert_eq!(mul_bits(f32::NAN, 1.0).0, CANONICAL_NAN);
        let (bits, f) = mul_bits(f32::INFINITY, 0.0);
        assert_eq!(bits, CANONICAL_NAN);
        assert_eq!(f, fflags::NV);
        let snan = f32::from_bits(0x7F80_0001);
        let (bits, f) = mul_bits(snan, 1.0);
        assert_eq!(bits, CANONICAL_NAN);
        assert_eq!(f, fflags::NV);
        assert_eq!(
            mul_bits(f32::NEG_INFINITY, 2.0).0,
            f32::NEG_INFINITY.to_bits()
        );
    }

    #[test]
    fn fma_single_rounding() {
        // 1 * (1 + 2^-23) + (-1) = 2^-23 exactly; a separate mul+add
        // computes the same here, but the fused path must be exact too.
        let b = f32::from_bits(0x3F80_0001);
        let (bits, f) = fma_bits(1.0, b, -1.0);
        assert_eq!(f32::from_bits(bits), f32::from_bits(0x3400_0000));
        assert_eq!(f, 0);

        // (1+2^-23)(1-2^-24) - 1 = 2^-24 - 2^-47, exact only when the
        // product feeds the add unrounded; mul-then-add yields 0.
        let bm = f32::from_bits(0x3F7F_FFFF);
        let (bits, f) = fma_bits(b, bm, -1.0);
        let expected = 2f32.powi(-24) - 2f32.powi(-47);
        assert_eq!(f32::from_bits(bits), expected);
        assert_eq!(f, 0);
        assert_eq!((b * bm - 1.0).to_bits(), 0.0f32.to_bits());
    }

    #[test]
    fn fma_exact_cancellation_gives_plus_zero() {
        assert_eq!(fma_bits(1.0, 1.0, -1.0).0, 0.0f32.to_bits());
        assert_eq!(fma_bits(-1.0, 1.0, 1.0).0, 0.0f32.to_bits());
    }

    #[test]
    fn fma_zero_product_keeps_addend() {
        assert_eq!(fma_bits(0.0, 5.0, 3.5).0, 3.5f32.to_bits());
        // Like-signed zeros keep the sign, unlike-signed give +0 (RNE).
        assert_eq!(fma_bits(-0.0, 5.0, -0.0).0, (-0.0f32).to_bits());
        assert_eq!(fma_bits(0.0, 5.0, -0.0).0, 0.0f32.to_bits());
        assert_eq!(fma_bits(0.0, -5.0, 0.0).0, 0.0f32.to_bits());
    }

    #[test]
    fn fma_far_apart_operands_are_sticky() {
        // Addend far below the product only perturbs rounding.
        let (bits, f) = fma_bits(1.0, 1.0, f32::from_bits(1));
        assert_eq!(f32::from_bits(bits), 1.0);
        assert_eq!(f, fflags::NX);
        let (bits, f) = fma_bits(1.0, 1.0, -f32::from_bits(1));
        assert_eq!(f32::from_bits(bits), 1.0);
        assert_eq!(f, fflags::NX);
        // Product far below the addend.
        let (bits, _) = fma_bits(f32::from_bits(1), f32::from_bits(1), 2.0);
        assert_eq!(f32::from_bits(bits), 2.0);
    }

    #[test]
    fn fma_inf_rules() {
        let (bits, f) = fma_bits(f32::INFINITY, 1.0, f32::NEG_INFINITY);
        assert_eq!(bits, CANONICAL_NAN);
        assert_eq!(f, fflags::NV);

        // inf * 0 raises invalid even with a quiet-NaN addend.
        let (bits, f) = fma_bits(f32::INFINITY, 0.0, f32::NAN);
        assert_eq!(bits, CANONICAL_NAN);
        assert_eq!(f, fflags::NV);

        assert_eq!(
            fma_bits(f32::INFINITY, -2.0, 1.0).0,
            f32::NEG_INFINITY.to_bits()
        );
        assert_eq!(fma_bits(1.0, 1.0, f32::INFINITY).0, f32::INFINITY.to_bits());
    }

    #[test]
    fn i32_conversion() {
        let mut f = 0;
        assert_eq!(i32_to_f32(0, &mut f).to_bits(), 0);
        assert_eq!(i32_to_f32(1, &mut f), 1.0);
        assert_eq!(i32_to_f32(-161_127, &mut f), -161_127.0);
        assert_eq!(i32_to_f32(1 << 24, &mut f), 16_777_216.0);
        assert_eq!(f, 0);

        // 2^24 + 1 is the first integer that rounds (ties to even).
        let mut f = 0;
        assert_eq!(i32_to_f32((1 << 24) + 1, &mut f), 16_777_216.0);
        assert_eq!(f, fflags::NX);

        let mut f = 0;
        assert_eq!(i32_to_f32(i32::MIN, &mut f), -2_147_483_648.0);
        assert_eq!(f, 0);
    }

    #[test]
    fn matches_native_on_a_grid() {
        // The native FPU is the hardware oracle on the test host.
        let vals = [
            0.0f32,
            -0.0,
            1.0,
            -1.0,
            1.5,
            0.1,
            -0.1,
            127.0,
            -127.0,
            3.402_823_5e38,
            1.175_494_4e-38,
            f32::from_bits(1),
            f32::from_bits(0x007F_FFFF),
            f32::from_bits(0x3F80_0001),
            6.25e-4,
        ];
        for &a in &vals {
            for &b in &vals {
                assert_eq!(
                    SoftFloat::mul(a, b).to_bits(),
                    (a * b).to_bits(),
                    "mul({a:e}, {b:e})"
                );
                for &c in &vals {
                    assert_eq!(
                        SoftFloat::fma(a, b, c).to_bits(),
                        a.mul_add(b, c).to_bits(),
                        "fma({a:e}, {b:e}, {c:e})"
                    );
                }
            }
        }
        for x in [-16_777_217, -255, -1, 0, 1, 3, 255, 16_777_217, i32::MAX] {
            assert_eq!(SoftFloat::from_i32(x).to_bits(), (x as f32).to_bits());
        }
    }
}
