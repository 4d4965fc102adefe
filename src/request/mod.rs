//! Request building
//!
//! Turns an operation on a table plus an optional [`Query`](crate::query::Query)
//! into a plain [`ApiRequest`] value. Nothing here touches the network; the
//! request is handed to a [`Transport`](crate::http::Transport).

mod builder;

pub use builder::{ApiRequest, RequestBuilder};
