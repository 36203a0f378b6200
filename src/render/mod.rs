pub mod dashboard;
pub mod ical;
