//! HTTP request handlers.
//!
//! Handlers are thin: they extract input, call the runtime services held in
//! [`AppState`](crate::state::AppState) and map errors via `HttpError`.

pub mod configure;
pub mod control;
pub mod events;
