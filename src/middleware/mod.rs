pub mod cors;
pub mod response;

pub use cors::{cors_middleware, CorsHeaders};
pub use response::{ApiResponse, ApiResult};
