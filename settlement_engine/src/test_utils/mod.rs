//! Helpers for integration tests: throwaway databases and a scriptable payment gateway.
pub mod mock_gateway;
pub mod prepare_env;

pub use mock_gateway::{ConfirmBehaviour, MockGateway};
pub use prepare_env::{prepare_test_env, random_db_path};
