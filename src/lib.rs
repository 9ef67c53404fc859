//! lunarfix
//!
//! Guarded, idempotent text patches for the LunarCrush GraphQL Workers
//! backend, plus the scripted fixes built on top of them. The applier
//! is the reusable core; everything under `fixes` is one hand-built
//! patch per historical edit.

pub mod applier;
pub mod block;
pub mod fixes;
pub mod patch;
