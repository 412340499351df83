//! A policy-driven extent allocation engine, the kind a logical-volume
//! manager uses to decide where to place one or more parallel logical
//! areas (stripes, mirror copies, parity images) of a requested size
//! across a set of devices with fragmented free space.
//!
//! Logically, this crate has three layers:
//! * The [data model](source): [`source::Source`] and [`source::Area`]
//!   describe free space; [`request::Request`] describes what to
//!   allocate and under what [`request::AllocPolicy`]; [`segment::Segment`]
//!   and [`segment::AllocationResult`] describe what was placed.
//! * The [policy selector](policy), a pure function choosing the best
//!   candidate area for a given policy, never mutating anything.
//! * The allocators, [`simple`] for independent per-area fills and
//!   [`sync_rounds`] for the harder case where several parallel areas must
//!   fragment identically.
//!
//! [`facade::allocate`] is the crate's one public entry point; everything
//! else is exported so callers can build and inspect requests and results,
//! but the placement logic itself is only ever driven through that single
//! function.
//!
//! This crate is a single-shot pure function over an allocation request:
//! it performs no I/O, holds no state between calls, and is not
//! responsible for device discovery, on-disk layout, or anything else
//! outside the allocation decision itself.

mod error;
mod facade;
mod policy;
mod request;
mod segment;
mod simple;
mod source;
mod sync_rounds;
mod util;

pub use error::AllocError;
pub use facade::{allocate, AllocationHandle};
pub use request::{AllocFlags, AllocPolicy, Request, TagMatch};
pub use segment::{AllocationResult, Segment};
pub use source::{Area, Source, SourceList};
