//! Quay - compiler argument translation for GNU and D toolchains
//!
//! This crate provides the compiler-abstraction layer of a build-system
//! generator: it turns toolchain-independent build intents into the literal
//! argument vectors of GCC-compatible compilers and of the three D front
//! ends (gdc, ldc2, dmd), and rewrites GNU-style arguments coming from
//! dependency metadata into the native dialect of ldc2 and dmd.

pub mod compilers;
pub mod util;

pub use compilers::{
    compiler_for, Compiler, CompilerError, CompilerFamily, CompilerIdentity, HostPlatform,
    TargetArch,
};
