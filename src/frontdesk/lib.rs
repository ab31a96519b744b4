//! # Frontdesk Architecture
//!
//! Frontdesk is a **local-first check-in engine** with a CLI attached. Staff
//! record visits against a roster held in a remote spreadsheet; every
//! mutation lands locally first and reaches the remote store later, so the
//! front desk keeps working when the network doesn't.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, args.rs, wired by main.rs)                │
//! │  - Parses arguments, formats output, owns stdout/stderr     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic: reads a snapshot, returns actions        │
//! │  - No I/O assumptions whatsoever                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Runtime (runtime.rs)                                       │
//! │  - Performs the engine's effects against real backends      │
//! │  - Generic over cache and remote, like the rest of the crate│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (engine.rs = state.rs + gate.rs + sync.rs)          │
//! │  - Pure state transitions, loader gating, queue draining    │
//! │  - Emits Effects, consumes Events; never touches I/O        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Backends (cache/, remote/)                                 │
//! │  - CacheStore: FileCache (production), MemoryCache (tests)  │
//! │  - RemoteSheets: HttpRemote, Offline, ScriptedRemote (tests)│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Rules That Matter
//!
//! - **Optimistic visibility**: a check-in shows up in the snapshot the
//!   moment it's dispatched, paired with a queued append command. The queue
//!   drains FIFO with at most one write in flight; a confirmed write
//!   dequeues, a failed one stays put for the next recovery.
//! - **Durable by default**: every snapshot change rewrites the five cache
//!   keys, so a reload resumes exactly where the process died — including
//!   the unsynced queue.
//! - **Gated remote work**: loaders run through an explicit state machine
//!   with declared prerequisites; the bulk roster fetch never runs over
//!   unconfirmed local writes.
//! - **At-least-once, not exactly-once**: the remote append is not
//!   idempotent. A confirmation lost mid-flight means the replay duplicates
//!   the row remotely; dedup is left to the spreadsheet's operator.
//!
//! ## Module Overview
//!
//! - [`model`]: sheet registry, typed values, rows, snapshot field types
//! - [`sheet`]: parse/format/sort between raw cells and typed rows
//! - [`state`]: the snapshot, its transitions, and the owning store
//! - [`gate`]: per-loader state machine with retries and generations
//! - [`sync`]: single-flight queue drain worker
//! - [`engine`]: the sans-IO composition of the three above
//! - [`runtime`]: performs effects against the chosen backends
//! - [`cache`]: durable five-key persistence
//! - [`remote`]: the spreadsheet API boundary
//! - [`commands`]: business logic behind each CLI verb
//! - [`config`], [`auth`], [`error`]: the usual suspects

pub mod auth;
pub mod cache;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod model;
pub mod remote;
pub mod runtime;
pub mod sheet;
pub mod state;
pub mod sync;
