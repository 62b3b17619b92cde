// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared Access Signature tokens for the Event Hubs REST API.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::ClientError;

type HmacSha256 = Hmac<Sha256>;

/// `SharedAccessSignature sr=..&sig=..&se=..&skn=..` for `resource_uri`,
/// valid for `ttl` from now.
pub(crate) fn sas_token(
    resource_uri: &str,
    key_name: &str,
    key: &str,
    ttl: Duration,
) -> Result<String, ClientError> {
    let expiry = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since_epoch| since_epoch.as_secs())
        .unwrap_or(0)
        + ttl.as_secs();
    sign(resource_uri, key_name, key, expiry)
}

/// The signature covers `"<url-encoded uri>\n<expiry>"`, HMAC-SHA256 keyed
/// with the shared access key, base64 then url-encoded into the token.
fn sign(resource_uri: &str, key_name: &str, key: &str, expiry: u64) -> Result<String, ClientError> {
    let encoded_uri = urlencoding::encode(resource_uri);
    let to_sign = format!("{encoded_uri}\n{expiry}");

    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).map_err(|_| ClientError::Signature)?;
    mac.update(to_sign.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!(
        "SharedAccessSignature sr={encoded_uri}&sig={}&se={expiry}&skn={key_name}",
        urlencoding::encode(&signature),
    ))
}
