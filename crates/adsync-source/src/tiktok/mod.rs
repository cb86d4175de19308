//! TikTok: the synchronous integrated report and the authorized-advertiser
//! list.

mod client;
pub mod rows;

pub use client::TiktokClient;
