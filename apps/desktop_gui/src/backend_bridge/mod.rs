//! Backend bridge: command queue types, card image loading, and the worker thread.

pub mod commands;
pub mod images;
pub mod runtime;
