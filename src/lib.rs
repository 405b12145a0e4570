// src/lib.rs

pub mod api;
pub mod app;
pub mod blockchain;
pub mod core;
pub mod service;
