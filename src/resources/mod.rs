//! ECS resources of a motion world.
//!
//! Long-lived data shared by the motion systems: time, configuration, the
//! injected store, bookkeeping of active elements, per-group state, in-flight
//! transitions and the delayed task queue.
//!
//! Overview
//! - `elementindex` – store id to entity lookup for active elements
//! - `groupstate` – per-group composure phase and explicit hold
//! - `memorystore` – in-process, JSON-loadable `EntityStore`
//! - `motionconfig` – INI-backed simulation tunables
//! - `rendertarget` – render target contract and a channel-backed target
//! - `scheduler` – delayed, cancellable tasks on simulated time
//! - `store` – external entity store contract and record types
//! - `tickclock` – fixed-rate tick accumulator
//! - `transitions` – in-flight angle transition records
//! - `worldtime` – simulation time and delta
pub mod elementindex;
pub mod groupstate;
pub mod memorystore;
pub mod motionconfig;
pub mod rendertarget;
pub mod scheduler;
pub mod store;
pub mod tickclock;
pub mod transitions;
pub mod worldtime;
