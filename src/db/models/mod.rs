mod appointment;
mod business_day;
mod schedule_exception;
mod service;
mod staff;
mod working_hours;

pub use appointment::*;
pub use business_day::*;
pub use schedule_exception::*;
pub use service::*;
pub use staff::*;
pub use working_hours::*;
