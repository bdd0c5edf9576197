pub mod constants;
pub mod model_resolver;
pub mod workspace;
