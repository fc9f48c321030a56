//! Data models
//!
//! Row types for the four hospital tables.

mod appointment;
mod doctor;
mod patient;
mod service;

pub use appointment::Appointment;
pub use doctor::Doctor;
pub use patient::Patient;
pub use service::Service;
