#[macro_use]
mod par;

pub mod align;
pub mod error;
pub mod io;
pub mod schedule;
pub mod scoring;
pub mod seq;
