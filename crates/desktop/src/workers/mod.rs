pub mod job_worker;
pub mod system_check;
