//! HTTP implementation of the remote boundary.
//!
//! The service is a website rather than an API: sessions are cookie based,
//! a CSRF request token is scraped from the login page, and most calls are
//! `GET`s with a cache-busting `dojo.preventCache` parameter. A fixed delay
//! is inserted before every request to stay under the service's rate limits.

mod client;
mod factory;
mod scrape;

pub use client::{BgaClient, BgaConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_DELAY};
pub use factory::BgaSessionFactory;
pub use scrape::{group_options, is_logged_in, parse_game_list, request_token};
