//! Completion signal: the RUNNING → HALTED transition emitted after the
//! last output row is written.
//!
//! The wire contract with the hosting supervisor is a single write of
//! [`HALT_SENTINEL`] to the physical address [`HTIF_TOHOST`]. On the
//! guest build that write is real and one-way: the supervisor stops the
//! machine and control never comes back. On the host build the kernel
//! is a plain returning function, so the transition is recorded in an
//! atomic counter instead; callers (and the halt-once tests) can
//! observe it through [`completions`].

use core::sync::atomic::{AtomicU64, Ordering};

/// HTIF `tohost` physical address the supervisor watches.
pub const HTIF_TOHOST: usize = 0x4000_8000;

/// Value whose arrival at [`HTIF_TOHOST`] means "computation finished,
/// halt". Must stay bit-exact across realizations.
pub const HALT_SENTINEL: u64 = 1;

static COMPLETIONS: AtomicU64 = AtomicU64::new(0);

/// Number of RUNNING → HALTED transitions this process has performed.
///
/// Always zero on the guest, where the first transition never returns.
pub fn completions() -> u64 {
    COMPLETIONS.load(Ordering::Acquire)
}

/// Signal completion to the hosting environment.
///
/// Guest: writes the sentinel to the HTIF address and parks; execution
/// resumes in the supervisor, not here.
#[cfg(target_arch = "riscv64")]
pub fn signal_done() -> ! {
    unsafe {
        core::ptr::write_volatile(HTIF_TOHOST as *mut u64, HALT_SENTINEL);
    }
    // The supervisor halts the machine on the write above; spin in case
    // it is a cycle late.
    loop {
        core::hint::spin_loop();
    }
}

/// Signal completion to the hosting environment.
///
/// Host: a no-op transition; control returns to the caller, which is
/// itself running under the supervisor's emulated environment.
#[cfg(not(target_arch = "riscv64"))]
pub fn signal_done() {
    COMPLETIONS.fetch_add(1, Ordering::Release);
}
