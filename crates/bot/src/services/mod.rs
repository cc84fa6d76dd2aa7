pub mod advisor_service;
pub mod command_service;
pub mod report_format;
pub mod report_job;
pub mod telegram_service;
