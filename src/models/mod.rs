#[macro_use]
pub mod choices;

pub mod calendar;
pub mod case;
pub mod dashboard;
pub mod document;
pub mod task;
pub mod user;
