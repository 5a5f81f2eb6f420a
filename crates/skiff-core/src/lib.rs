//! # skiff-core — editor core for skiff
//!
//! This crate contains the parts of the editor that must stay internally
//! consistent across edits, scrolling, and highlight-state propagation:
//!
//! - **[`row`]** — `Row`: one logical line with raw, rendered (tab-expanded),
//!   and highlight representations, plus the raw-offset ↔ render-column maps
//! - **[`buffer`]** — `Buffer`: the ordered row store with editing operations,
//!   file I/O, dirty tracking, and the cross-row re-highlight cascade
//! - **[`syntax`]** — static registry of per-language highlight profiles
//! - **[`highlight`]** — the per-row lexical classifier
//! - **[`view`]** — `Cursor` and `Viewport` (scroll offsets, clamping)
//! - **[`screen`]** — the frame compositor writing one output buffer per frame
//! - **[`search`]** — incremental search sessions with a transient match
//!   overlay and cancel-restore
//!
//! The terminal itself (raw mode, key decoding, output flushing) lives in
//! `skiff-term`; this crate only ever writes escape sequences into an
//! in-memory [`skiff_term::output::OutputBuffer`].

pub mod buffer;
pub mod highlight;
pub mod row;
pub mod screen;
pub mod search;
pub mod syntax;
pub mod view;
