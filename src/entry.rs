//! Fixed-symbol kernel entry.
//!
//! `kernel_entry` is the one externally callable surface: a hosting
//! supervisor either loads it from the cdylib as a native hook, or
//! embeds the freestanding guest build of it in a firmware image and
//! emulates it instruction by instruction. Both paths compute identical
//! bits, so the supervisor may short-circuit the emulation with the
//! native call whenever the hook is installed.
//!
//! The ABI is frozen: symbol name, argument order, and the completion
//! signal are the whole wire contract. No validation happens here —
//! shape violations are caller precondition failures, not errors.

use crate::float::DefaultFloat;
use crate::halt;
use crate::kernel::dot_row;

/// Grouped-quantized matvec over raw caller-owned buffers.
///
/// Computes `xout[i] = sum_j dequant(xq[j]) * dequant(wq[i*n + j])` for
/// all `d` rows, then performs the completion-signal transition exactly
/// once. On the riscv64 guest build this call does not return; control
/// transfers to the hosting supervisor via the HTIF halt write.
///
/// # Safety
///
/// Caller must uphold the buffer contract: `xq` holds `n` values, `xs`
/// holds `n / gs`, `wq` holds `d * n` row-major, `ws` holds `d * (n /
/// gs)`, `xout` has room for `d` writes, and no other invocation runs
/// concurrently over overlapping buffers.
#[no_mangle]
pub unsafe extern "C" fn kernel_entry(
    xout: *mut f32,
    xq: *const i8,
    xs: *const f32,
    wq: *const i8,
    ws: *const f32,
    n: u64,
    d: u64,
    gs: u64,
) {
    let n = n as usize;
    let d = d as usize;
    let gs = gs as usize;
    let groups = if gs == 0 { 0 } else { n / gs };

    let xq = core::slice::from_raw_parts(xq, n);
    let xs = core::slice::from_raw_parts(xs, groups);
    let wq = core::slice::from_raw_parts(wq, d * n);
    let ws = core::slice::from_raw_parts(ws, d * groups);
    let xout = core::slice::from_raw_parts_mut(xout, d);

    let row = |i: usize| {
        dot_row::<DefaultFloat>(
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

    halt::signal_done();
}
