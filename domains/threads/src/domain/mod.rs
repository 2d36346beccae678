//! Domain layer for the Threads domain

pub mod entities;
