pub mod config;
pub mod convert;
pub mod model;
pub mod wire;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
