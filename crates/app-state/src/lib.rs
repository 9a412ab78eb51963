//! Application state management for Pet Adoption
//!
//! This crate provides the unidirectional state loop every screen runs on:
//! pure update functions, effect handlers that talk to collaborators, and a
//! runtime that serializes model changes and delivers one-shot view effects.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod effect;
pub mod state_loop;
pub mod update;

pub use effect::EffectHandler;
pub use state_loop::{LoopConfig, LoopConnection, StateLoop, StateLoopError};
pub use update::{First, Next, Update};
