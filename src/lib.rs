//! qmv-kernels: deterministic grouped-quantized matvec kernel.
//!
//! Computes `xout[i] = sum_j dequant(xq[j]) * dequant(wq[i,j])` for a
//! row-major int8 weight matrix and an int8 input vector with per-group
//! f32 scales, guaranteeing bit-identical results between:
//!
//! - **Hardware floats**: native single-precision ops with the
//!   round-to-nearest-even mode encoded per instruction (RISC-V guest).
//! - **Software floats**: a bit-accurate IEEE-754 emulation of the same
//!   ops, matching the instruction-level emulator a supervisor runs
//!   when no native hook is installed.
//!
//! The realization is picked at build time by target architecture, never
//! at runtime, so the identical algorithm serves both as a fast native
//! substitute installed by a hosting supervisor and as the freestanding
//! guest routine that supervisor otherwise emulates.
//!
//! # Quick Start
//!
//! ```
//! use qmv_kernels::matvec_q8;
//!
//! let xq = [1i8, 2, 3, 4];
//! let xs = [1.0f32, 1.0];
//! let wq = [1i8, 1, 1, 1];
//! let ws = [1.0f32, 1.0];
//! let mut xout = [0.0f32; 1];
//! matvec_q8(&mut xout, &xq, &xs, &wq, &ws, 2).unwrap();
//! assert_eq!(xout[0], 10.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod float;
pub mod halt;
pub mod kernel;

// Fixed-symbol `extern "C"` entry for host loading / guest embedding.
pub mod entry;

pub use float::{DefaultFloat, Float32Ops, SoftFloat};
#[cfg(any(target_arch = "riscv64", feature = "std"))]
pub use float::HardFloat;

pub use halt::{completions, HALT_SENTINEL, HTIF_TOHOST};
pub use kernel::dot_row;

#[cfg(feature = "std")]
pub use kernel::{matvec_q8, matvec_q8_with, KernelError, KernelResult};
