pub mod extractor;
pub mod job;
pub mod orchestrator;
