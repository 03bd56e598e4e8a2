mod appointment_repository;
mod catalog_repository;
mod schedule_repository;

pub use appointment_repository::AppointmentRepository;
pub use catalog_repository::CatalogRepository;
pub use schedule_repository::ScheduleRepository;
