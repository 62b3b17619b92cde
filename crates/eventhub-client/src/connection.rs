// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::ClientError;

/// Parsed Event Hub connection string:
/// `Endpoint=sb://<namespace>/;SharedAccessKeyName=<name>;SharedAccessKey=<key>;EntityPath=<hub>`.
///
/// `EntityPath` is required; without it there is no hub to address.
/// `http://`/`https://` endpoints are accepted as well so emulators and test
/// servers can stand in for a real namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    endpoint: String,
    key_name: String,
    key: String,
    entity_path: String,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;
        let mut entity_path = None;

        for segment in raw.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((name, value)) = segment.split_once('=') else {
                return Err(ClientError::ConnectionString(format!(
                    "segment without '=': {segment}"
                )));
            };
            match name.trim() {
                "Endpoint" => endpoint = Some(value.trim().to_string()),
                "SharedAccessKeyName" => key_name = Some(value.trim().to_string()),
                "SharedAccessKey" => key = Some(value.trim().to_string()),
                "EntityPath" => entity_path = Some(value.trim().to_string()),
                // Unknown segments (e.g. UseDevelopmentEmulator) are ignored
                _ => {}
            }
        }

        let endpoint = endpoint
            .ok_or_else(|| ClientError::ConnectionString("missing Endpoint".to_string()))?;
        let endpoint = if let Some(host) = endpoint.strip_prefix("sb://") {
            let host = host.trim_end_matches('/');
            if host.is_empty() {
                return Err(ClientError::ConnectionString("empty Endpoint".to_string()));
            }
            format!("https://{host}")
        } else if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.trim_end_matches('/').to_string()
        } else {
            return Err(ClientError::ConnectionString(format!(
                "unsupported Endpoint scheme: {endpoint}"
            )));
        };

        Ok(ConnectionString {
            endpoint,
            key_name: key_name.ok_or_else(|| {
                ClientError::ConnectionString("missing SharedAccessKeyName".to_string())
            })?,
            key: key.ok_or_else(|| {
                ClientError::ConnectionString("missing SharedAccessKey".to_string())
            })?,
            entity_path: entity_path.ok_or_else(|| {
                ClientError::ConnectionString("missing EntityPath".to_string())
            })?,
        })
    }

    /// Name of the hub this connection addresses (the `EntityPath` segment).
    #[must_use]
    pub fn entity_path(&self) -> &str {
        &self.entity_path
    }

    /// `https://<namespace>/<hub>`, used as the SAS resource URI and as the
    /// base of the send URL.
    #[must_use]
    pub fn resource_uri(&self) -> String {
        format!("{}/{}", self.endpoint, self.entity_path)
    }

    pub(crate) fn key_name(&self) -> &str {
        &self.key_name
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }
}
