//! A client for [Nyckel](https://www.nyckel.com), a hosted classification
//! service.
//!
//! The crate authenticates with an OAuth2 client-credentials exchange and
//! then issues blocking, one-request-per-call operations against functions,
//! labels, and samples.
//!
//! # HTTP Requests and Responses
//!
//! Every operation is a request type implementing [`ApiRequest`], whose
//! associated [`ApiRequest::Response`] names the decoded result. [`Client`]
//! performs the round trip with `ureq`, but [`ApiRequest::into_request`]
//! produces a plain [`http::Request`], so any HTTP client will do; feed the
//! status and buffered body to [`classify`] to decode the response.
//!
//! # Example
//!
//! ```no_run
//! use nyckel::{Client, OrAbort as _, Profile};
//!
//! # fn main() -> anyhow::Result<()> {
//! let profile = Profile::from_default_env()?;
//! let mut client = Client::new(profile);
//!
//! let credential = client.exchange(chrono::Utc::now())?;
//! client.set_credential(credential);
//!
//! for function in client.list_functions()? {
//!     println!("{} ({} -> {})", function.name, function.input, function.output);
//! }
//!
//! // Or, when an error should stop the program:
//! let _labels = client.list_labels("function_abc").or_abort("ListLabels");
//! # Ok(())
//! # }
//! ```

#![warn(
    anonymous_parameters,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_qualifications,
    variant_size_differences
)]

mod api;
mod client;
mod config;

pub use api::*;
pub use client::Client;
pub use config::{Error as ConfigError, Profile};
