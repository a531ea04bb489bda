// Reviews module - customer review feed: paginated listing, submission,
// and the client-side feed controller

pub mod feed;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;


pub use feed::{next_page, Page, ReviewFeed, PAGE_SIZE};
pub use models::Review;
pub use routes::reviews_routes;
