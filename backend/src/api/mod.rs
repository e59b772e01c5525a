mod device_service_handlers;
mod error;
mod handlers;
pub mod router;

pub use router::create_router;
