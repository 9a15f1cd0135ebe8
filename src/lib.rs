pub mod astro;
pub mod calendar;
pub mod config;
pub mod file;
pub mod math;
pub mod orrery;
pub mod transfer;

#[cfg(test)]
pub mod consts;
