// src/reviews/feed.rs
//! Client-side review feed controller
//!
//! Owns the loaded page of reviews, the authoritative server count, and
//! the busy flags that gate duplicate in-flight calls. Submissions
//! re-fetch the first page after a short delay instead of splicing the
//! new review into local state; the backing store is eventually
//! consistent and the row may not be visible immediately.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::models::{GetReviewsResponse, Review, ReviewDraft};
use super::validators::ReviewValidator;
use crate::auth::Session;
use crate::common::{Locale, Notifier, Toast, Validator};

/// Reviews fetched per page
pub const PAGE_SIZE: i64 = 5;

/// Delay before the post-submit re-fetch
pub const POST_SUBMIT_REFRESH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Next page to fetch given what is loaded and the server-reported total;
/// `None` when everything the server knows about is already loaded
pub fn next_page(loaded: usize, total: i64) -> Option<Page> {
    if loaded as i64 >= total {
        return None;
    }
    Some(Page {
        limit: PAGE_SIZE,
        offset: loaded as i64,
    })
}

pub struct ReviewFeed {
    http: Client,
    api_base: String,
    notifier: Arc<dyn Notifier>,
    locale: Locale,
    all_reviews: Vec<Review>,
    reviews_count: i64,
    reviews_showing: i64,
    sending: bool,
    loading: bool,
    loading_more: bool,
    error: bool,
}

impl ReviewFeed {
    pub fn new(
        http: Client,
        api_base: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        locale: Locale,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            notifier,
            locale,
            all_reviews: Vec::new(),
            reviews_count: 0,
            reviews_showing: PAGE_SIZE,
            sending: false,
            loading: true,
            loading_more: false,
            error: false,
        }
    }

    pub fn all_reviews(&self) -> &[Review] {
        &self.all_reviews
    }

    pub fn reviews_count(&self) -> i64 {
        self.reviews_count
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Fetch one page; a failed fetch degrades to an empty page rather
    /// than surfacing an error to the rendering flow
    async fn fetch_reviews(&self, limit: i64, offset: i64) -> (Vec<Review>, i64) {
        let result = self
            .http
            .post(format!("{}/api/db/get-reviews", self.api_base))
            .json(&serde_json::json!({ "limit": limit, "offset": offset }))
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                error!(status = %response.status(), "Error fetching reviews");
                return (Vec::new(), 0);
            }
            Err(e) => {
                error!(error = %e, "Error fetching reviews");
                return (Vec::new(), 0);
            }
        };

        match response.json::<GetReviewsResponse>().await {
            Ok(page) => (page.data, page.count),
            Err(e) => {
                error!(error = %e, "Malformed reviews response");
                (Vec::new(), 0)
            }
        }
    }

    /// Initial load: first page plus the authoritative total
    pub async fn load_initial(&mut self) {
        self.loading = true;
        let (data, count) = self.fetch_reviews(self.reviews_showing, 0).await;
        self.all_reviews = data;
        self.reviews_count = count;
        self.loading = false;
    }

    /// Incremental "load more". A no-op while a load is in flight or when
    /// everything is already loaded; returns whether a fetch happened.
    pub async fn load_more(&mut self) -> bool {
        if self.loading_more {
            return false;
        }

        let current_len = self.all_reviews.len();
        let page = match next_page(current_len, self.reviews_count) {
            Some(page) => page,
            None => return false,
        };

        self.loading_more = true;

        let (data, count) = self.fetch_reviews(page.limit, page.offset).await;

        // Append and adopt the server total, which may itself have grown
        self.all_reviews.extend(data);
        self.reviews_count = count;
        self.reviews_showing = current_len as i64 + PAGE_SIZE;
        self.loading_more = false;

        true
    }

    /// Re-fetch everything currently showing without toggling the loading
    /// flag, so existing reviews stay on screen
    pub async fn refresh(&mut self) {
        let (data, count) = self.fetch_reviews(self.reviews_showing, 0).await;
        self.all_reviews = data;
        self.reviews_count = count;
    }

    /// Submit a review. Rejected locally (no network call) when a send is
    /// already in flight, validation fails, or there is no session.
    /// `reset` runs on success so the form can clear itself.
    pub async fn send_review(
        &mut self,
        draft: ReviewDraft,
        session: Option<&Session>,
        reset: impl FnOnce(),
    ) -> bool {
        if self.sending {
            return false;
        }

        self.sending = true;
        self.error = false;

        let messages = self.locale.messages();

        // Client-side re-check of the bounds the server also enforces
        let validation = ReviewValidator.validate(&draft);
        if !validation.is_valid {
            warn!(errors = ?validation.errors, "Review rejected client-side");
            self.notifier.notify(Toast::error(messages.review_error));
            self.error = true;
            self.sending = false;
            return false;
        }

        let session = match session {
            Some(session) => session,
            None => {
                self.notifier.notify(Toast::error(messages.auth_required));
                self.error = true;
                self.sending = false;
                return false;
            }
        };

        let result = self
            .http
            .post(format!("{}/api/db/insert-review", self.api_base))
            .bearer_auth(&session.access_token)
            .json(&serde_json::json!({
                "rating": draft.rating,
                "title": draft.title,
                "description": draft.description,
                "image": draft.image,
            }))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Error sending review");
                self.notifier.notify(Toast::error(messages.review_error));
                self.error = true;
                self.sending = false;
                return false;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let message = if status == reqwest::StatusCode::UNAUTHORIZED {
                messages.auth_required.to_string()
            } else {
                response
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|body| {
                        body.get("error")
                            .or_else(|| body.get("message"))
                            .and_then(|v| v.as_str())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| messages.review_error.to_string())
            };

            error!(status = %status, message = %message, "Error sending review");
            self.notifier.notify(Toast::error(message));
            self.error = true;
            self.sending = false;
            return false;
        }

        info!("Review submitted");
        self.notifier.notify(Toast::success(messages.review_inserted));
        reset();
        self.sending = false;

        // Absorb eventual-consistency lag before re-reading the feed
        tokio::time::sleep(POST_SUBMIT_REFRESH_DELAY).await;
        self.refresh().await;

        true
    }

    #[cfg(test)]
    pub(crate) fn force_state(
        &mut self,
        reviews: Vec<Review>,
        count: i64,
        loading_more: bool,
        sending: bool,
    ) {
        self.all_reviews = reviews;
        self.reviews_count = count;
        self.loading_more = loading_more;
        self.sending = sending;
    }
}
