//! 线上传输对象（DTO）及其与领域模型之间的映射

mod common;
pub use common::*;

mod error;
pub use error::*;

pub mod validation;

mod device_service;
pub use device_service::*;

mod requests;
pub use requests::*;

mod responses;
pub use responses::*;
