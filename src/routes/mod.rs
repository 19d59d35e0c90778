pub mod auth;
pub mod calendar;
pub mod cases;
pub mod dashboard;
pub mod documents;
pub mod health;
pub mod tasks;
pub mod users;

mod uploads;
