//! Datasette backend
//!
//! Executes compiled entity queries against a remote Datasette instance over
//! its JSON API.

mod client;

pub use client::{DatasetteClient, DatasetteSettings, ParamMode};
