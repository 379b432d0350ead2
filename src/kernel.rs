//! Grouped dequantized dot-product accumulator and the safe slice API.
//!
//! One output row is one call to [`dot_row`]: walk the row in groups of
//! `gs`, accumulate an exact `i32` dot product per group, then fold
//! `float(ival) * (xs[g] * ws[g])` into the running sum with a single
//! FMA. Group order is strictly increasing and the scale multiply
//! happens before the FMA; float addition is not associative, so the
//! bit-reproducibility contract fixes the operation order, not just the
//! math.

use crate::float::Float32Ops;

/// Compute one output row: `sum_g fma(float(ival_g), xs[g] * ws[g], ·)`.
///
/// `wrow` is row `i` of the weight matrix (`n` values), `wsrow` its
/// `n / gs` group scales. A trailing partial group (when `gs` does not
/// divide `n`) contributes nothing, matching the reference outputs; the
/// safe API rejects that shape outright.
#[inline]
pub fn dot_row<F: Float32Ops>(
    xq: &[i8],
    xs: &[f32],
    wrow: &[i8],
    wsrow: &[f32],
    gs: usize,
) -> f32 {
    let n = xq.len();
    if gs == 0 {
        return 0.0;
    }
    let mut sum = 0.0f32;
    let mut j = 0;
    while j + gs <= n {
        let mut ival: i32 = 0;
        for k in j..j + gs {
            ival += xq[k] as i32 * wrow[k] as i32;
        }
        let scale = F::mul(xs[j / gs], wsrow[j / gs]);
        sum = F::fma(F::from_i32(ival), scale, sum);
        j += gs;
    }
    sum
}

#[cfg(feature = "std")]
pub use checked::{matvec_q8, matvec_q8_with, KernelError, KernelResult};

#[cfg(feature = "std")]
mod checked {
    use super::dot_row;
    use crate::float::{DefaultFloat, Float32Ops};
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum KernelError {
        #[error("dimensions must be > 0")]
        EmptyDims,
        #[error("group size {gs} does not divide row length {n}")]
        GroupSizeMismatch { gs: usize, n: usize },
        #[error("{name} length {got} does not match expected {expected}")]
        LengthMismatch {
            name: &'static str,
            got: usize,
            expected: usize,
        },
        #[error("weight matrix {d} x {n} overflows usize")]
        DimOverflow { d: usize, n: usize },
    }

    pub type KernelResult<T> = Result<T, KernelError>;

    fn validate_dims(
        n: usize,
        d: usize,
        gs: usize,
        xs_len: usize,
        wq_len: usize,
        ws_len: usize,
    ) -> KernelResult<usize> {
        if n == 0 || d == 0 || gs == 0 {
            return Err(KernelError::EmptyDims);
        }
        if n % gs != 0 {
            return Err(KernelError::GroupSizeMismatch { gs, n });
        }
        let groups = n / gs;
        let wq_expected = d
            .checked_mul(n)
            .ok_or(KernelError::DimOverflow { d, n })?;
        let ws_expected = d
            .checked_mul(groups)
            .ok_or(KernelError::DimOverflow { d, n })?;
        if xs_len != groups {
            return Err(KernelError::LengthMismatch {
                name: "xs",
                got: xs_len,
                expected: groups,
            });
        }
        if wq_len != wq_expected {
            return Err(KernelError::LengthMismatch {
                name: "wq",
                got: wq_len,
                expected: wq_expected,
            });
        }
        if ws_len != ws_expected {
            return Err(KernelError::LengthMismatch {
                name: "ws",
                got: ws_len,
                expected: ws_expected,
            });
        }
        Ok(groups)
    }

    /// Grouped-quantized matvec over an explicit float realization.
    ///
    /// `xout` supplies `d`, `xq` supplies `n`; every buffer length is
    /// checked before any row is computed. Rows are independent and
    /// write disjoint `xout` slots, so the fan-out needs no locking.
    pub fn matvec_q8_with<F: Float32Ops>(
        xout: &mut [f32],
        xq: &[i8],
        xs: &[f32],
        wq: &[i8],
        ws: &[f32],
        gs: usize,
    ) -> KernelResult<()> {
        let n = xq.len();
        let d = xout.len();
        let groups = validate_dims(n, d, gs, xs.len(), wq.len(), ws.len())?;

        let row = |i: usize| {
            dot_row::<F>(
                xq,
                xs,
                &wq[i * n..(i + 1) * n],
                &ws[i * groups..(i + 1) * groups],
                gs,
            )
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            xout.par_iter_mut()
                .enumerate()
                .for_each(|(i, out)| *out = row(i));
        }
        #[cfg(not(feature = "parallel"))]
        for (i, out) in xout.iter_mut().enumerate() {
            *out = row(i);
        }
        Ok(())
    }

    /// Grouped-quantized matvec with the build's default realization:
    /// hardware floats on the riscv64 guest, the bit-identical software
    /// emulation everywhere else.
    pub fn matvec_q8(
        xout: &mut [f32],
        xq: &[i8],
        xs: &[f32],
        wq: &[i8],
        ws: &[f32],
        gs: usize,
    ) -> KernelResult<()> {
        matvec_q8_with::<DefaultFloat>(xout, xq, xs, wq, ws, gs)
    }
}
