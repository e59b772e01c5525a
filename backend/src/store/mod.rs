mod memory_device_service_store;
pub use memory_device_service_store::*;
