// SPDX-License-Identifier: MIT
//
// skiff-term — terminal layer for skiff.
//
// Raw-mode control via termios, ANSI escape generation, whole-frame
// output buffering, and an input parser that turns the raw stdin byte
// stream into discrete key events.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via ANSI escape
// sequences and raw termios. The editor builds exactly one output
// buffer per frame and writes it with a single syscall; every escape
// code it emits is earned.

pub mod ansi;
pub mod input;
pub mod output;
pub mod terminal;
