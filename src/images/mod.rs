// Images module - pass-through proxy for external avatar images and the
// URL resolution rules the review feed renders avatars with

pub mod proxy;
pub mod resolve;
pub mod routes;

pub use resolve::{fallback_after_error, resolve_image_url, PLACEHOLDER_IMAGE};
pub use routes::images_routes;
