pub mod db;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
