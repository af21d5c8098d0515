//! Core primitives shared by every module: logical time and phase sequencing.

pub mod time;
