//! Watches a fixed set of Docker containers and sends Telegram alerts while
//! any of them stays stopped, followed by a message once it runs again.
//!
//! Configuration comes from the environment:
//! - `CONTAINER_1`, `CONTAINER_2`, ...: `name=<container>;initial=<min>;repeat=<min>`
//! - `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`: required
//! - `TELEGRAM_API_URL`: optional bot API base URL
//! - `RUST_LOG`: log level (default: info)

pub mod config;
pub mod monitor;
pub mod notify;
pub mod runtime;
pub mod startup;
