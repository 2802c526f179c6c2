// src/lib.rs
pub mod io;
pub mod settings;
pub mod event;
