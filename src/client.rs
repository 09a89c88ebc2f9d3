//! Connecting to the platform.

mod http;
mod platform;

pub use http::HttpSession;
pub use platform::{PlatformClient, PlatformClientBuilder};
