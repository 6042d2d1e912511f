//! API wire types

pub mod error;
pub mod image;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use image::ImageResponse;
