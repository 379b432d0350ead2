//! Hardware realization of the scalar float primitives.
//!
//! On `riscv64` each operation is a single F-extension instruction with
//! the `rne` rounding mode encoded in the instruction itself, so the
//! result does not depend on the `frm` CSR. On other architectures the
//! host FPU's native ops are used (`*`, `f32::mul_add`, `as f32` — all
//! RNE-rounded per IEEE-754); this is the reference the software
//! realization is checked against in the equivalence tests.

use super::Float32Ops;

/// Native single-precision float ops.
#[derive(Debug, Clone, Copy)]
pub struct HardFloat;

#[cfg(target_arch = "riscv64")]
impl Float32Ops for HardFloat {
    #[inline(always)]
    fn mul(a: f32, b: f32) -> f32 {
        let r: f32;
        unsafe {
            core::arch::asm!(
                "fmul.s {r}, {a}, {b}, rne",
                r = out(freg) r,
                a = in(freg) a,
                b = in(freg) b,
                options(pure, nomem, nostack),
            );
        }
        r
    }

    #[inline(always)]
    fn fma(a: f32, b: f32, c: f32) -> f32 {
        let r: f32;
        unsafe {
            core::arch::asm!(
                "fmadd.s {r}, {a}, {b}, {c}, rne",
                r = out(freg) r,
                a = in(freg) a,
                b = in(freg) b,
                c = in(freg) c,
                options(pure, nomem, nostack),
            );
        }
        r
    }

    #[inline(always)]
    fn from_i32(x: i32) -> f32 {
        let r: f32;
        unsafe {
            core::arch::asm!(
                "fcvt.s.w {r}, {x}, rne",
                r = out(freg) r,
                x = in(reg) x,
                options(pure, nomem, nostack),
            );
        }
        r
    }
}

#[cfg(not(target_arch = "riscv64"))]
impl Float32Ops for HardFloat {
    #[inline(always)]
    fn mul(a: f32, b: f32) -> f32 {
        a * b
    }

    #[inline(always)]
    fn fma(a: f32, b: f32, c: f32) -> f32 {
        // Correctly rounded even without an FMA unit: lowers to fmaf.
        a.mul_add(b, c)
    }

    #[inline(always)]
    fn from_i32(x: i32) -> f32 {
        x as f32
    }
}
