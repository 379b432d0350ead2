//! Scalar f32 primitives with a fixed round-to-nearest-even policy.
//!
//! Everything the kernel does to a float goes through [`Float32Ops`]:
//! multiply, fused multiply-add, and int32 conversion. Two realizations
//! exist and the choice is made by target configuration at build time —
//! there is no runtime branch, so monomorphized kernel code compiles to
//! either pure hardware instructions or pure integer arithmetic.
//!
//! - [`hard::HardFloat`]: native FPU instructions. On `riscv64` the
//!   rounding mode is encoded in each instruction (`rne`), independent
//!   of the `frm` control register.
//! - [`soft::SoftFloat`]: bit-accurate software IEEE-754 emulation with
//!   RISC-V NaN and exception-flag semantics. This is the realization a
//!   host process uses so its results match an instruction-level
//!   emulation of the guest bit for bit.

pub mod soft;

#[cfg(any(target_arch = "riscv64", feature = "std"))]
pub mod hard;

pub use soft::SoftFloat;

#[cfg(any(target_arch = "riscv64", feature = "std"))]
pub use hard::HardFloat;

/// RISC-V `fflags` exception bits. The kernel computes and discards
/// them; the soft realization still reports them faithfully.
pub mod fflags {
    /// Inexact.
    pub const NX: u32 = 0x01;
    /// Underflow.
    pub const UF: u32 = 0x02;
    /// Overflow.
    pub const OF: u32 = 0x04;
    /// Divide by zero (never raised by this kernel's op set).
    pub const DZ: u32 = 0x08;
    /// Invalid operation.
    pub const NV: u32 = 0x10;
}

/// The three scalar float operations the kernel is built from.
///
/// All operations round to nearest-even and are pure: no state, no
/// dependence on the ambient floating-point environment.
pub trait Float32Ops {
    /// IEEE-754 single-precision multiply.
    fn mul(a: f32, b: f32) -> f32;

    /// Fused multiply-add `a * b + c` with a single rounding step.
    fn fma(a: f32, b: f32, c: f32) -> f32;

    /// int32 → f32 conversion (rounds once `|x| > 2^24`).
    fn from_i32(x: i32) -> f32;
}

/// Realization the kernel entry uses for this build.
///
/// Guest (riscv64): hardware instructions. Host: the software emulation,
/// so a native hook reproduces the emulated guest exactly.
#[cfg(target_arch = "riscv64")]
pub type DefaultFloat = hard::HardFloat;

#[cfg(not(target_arch = "riscv64"))]
pub type DefaultFloat = soft::SoftFloat;
