pub mod kernel;
pub mod solve;
