// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Minimal Azure Event Hubs client: connection string parsing, SAS token
//! auth, and batched sends over the REST API. Nothing here retries; callers
//! own the delivery policy.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod client;
pub mod connection;
mod sas;

pub use client::{EventData, EventHubClient};
pub use connection::ConnectionString;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid connection string: {0}")]
    ConnectionString(String),
    #[error("failed to sign request")]
    Signature,
    #[error("invalid payload: {0}")]
    Payload(String),
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("event hub rejected the batch ({status}): {detail}")]
    Rejected { status: StatusCode, detail: String },
}
