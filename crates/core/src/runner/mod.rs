pub mod registry;
pub mod task_logger;
pub mod task_runner;
