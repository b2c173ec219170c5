pub mod advisor;
pub mod display;
pub mod input;
