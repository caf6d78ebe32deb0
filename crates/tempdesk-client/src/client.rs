//! Main client implementation

use crate::{
    config::Credentials,
    types::*,
    ClientError, Config, Result,
};
use bytes::Bytes;
use reqwest::{header, Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tempdesk_core::auth::{authorization_header, signing_message};
use tempdesk_core::{http_date, FilePermission, PermissionChange, UserProfile};
use tracing::{debug, instrument};

const META_HEADER_PREFIX: &str = "x-desk-meta-";
const OWNER_HEADER: &str = "x-desk-owner";
const ERROR_CODE_HEADER: &str = "x-desk-error-code";

/// Compute the `Date` and `Authorization` values for a request
pub fn sign_request(
    method: &Method,
    path: &str,
    credentials: &Credentials,
    date: &str,
) -> Result<String> {
    let message = signing_message(method.as_str(), path, &credentials.name, date);
    let digest = tempdesk_crypto::sign(message.as_bytes(), credentials.key.as_bytes())?;
    Ok(authorization_header(&credentials.name, &digest))
}

/// tempdesk client
pub struct DeskClient {
    config: Config,
    http: Client,
}

impl DeskClient {
    /// Create a new client with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            config
                .user_agent
                .parse()
                .map_err(|_| ClientError::Config("invalid user agent".to_string()))?,
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { config, http })
    }

    /// Create an anonymous client for an endpoint
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Self::new(Config::new(endpoint))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Service ====================

    /// Whether the gateway answers its health check
    pub async fn health(&self) -> Result<bool> {
        let url = self.url("/")?;
        let response = self.http.head(url).send().await?;
        Ok(response.status().is_success())
    }

    // ==================== Users ====================

    /// Register a new user; unsigned
    #[instrument(skip(self, password, meta))]
    pub async fn sign_up(
        &self,
        name: &str,
        password: &str,
        meta: &BTreeMap<String, String>,
    ) -> Result<UserProfile> {
        let body = serde_json::to_vec(&SignUpRequest { name, password, meta })
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let response = self
            .request(
                Method::POST,
                "/user",
                None,
                vec![(header::CONTENT_TYPE.to_string(), "application/json".to_string())],
                Some(body.into()),
                false,
            )
            .await?;
        json(response).await
    }

    /// Profile of the signing user
    #[instrument(skip(self))]
    pub async fn whoami(&self) -> Result<UserProfile> {
        let response = self.signed(Method::GET, "/user", None, None).await?;
        json(response).await
    }

    /// Replace the signing user's key and/or metadata.
    ///
    /// A new key is adopted for subsequent requests.
    #[instrument(skip(self, password, meta))]
    pub async fn update_user(
        &mut self,
        password: Option<&str>,
        meta: Option<&BTreeMap<String, String>>,
    ) -> Result<UserProfile> {
        let body = serde_json::to_vec(&UpdateUserRequest { password, meta })
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let response = self
            .signed(Method::PUT, "/user", None, Some(body.into()))
            .await?;
        let profile = json(response).await?;

        if let (Some(password), Some(credentials)) = (password, self.config.credentials.as_mut()) {
            credentials.key = password.to_string();
        }
        Ok(profile)
    }

    /// Delete the signing user
    #[instrument(skip(self))]
    pub async fn delete_user(&self) -> Result<()> {
        self.signed(Method::DELETE, "/user", None, None).await?;
        Ok(())
    }

    // ==================== Files ====================

    /// Create or overwrite a file
    #[instrument(skip(self, data, meta))]
    pub async fn put_file(
        &self,
        path: &str,
        data: impl Into<Bytes>,
        meta: &BTreeMap<String, String>,
    ) -> Result<FileInfo> {
        let headers = meta
            .iter()
            .map(|(k, v)| (format!("{}{}", META_HEADER_PREFIX, k.to_ascii_lowercase()), v.clone()))
            .collect();
        let response = self
            .request(
                Method::PUT,
                &file_path(path),
                None,
                headers,
                Some(data.into()),
                true,
            )
            .await?;
        json(response).await
    }

    /// Download a file as the signing user
    #[instrument(skip(self))]
    pub async fn get_file(&self, path: &str) -> Result<FileObject> {
        let response = self.signed(Method::GET, &file_path(path), None, None).await?;
        file_object(response).await
    }

    /// Download a public file with an access code.
    ///
    /// Signed when the client has credentials, so owners and permitted
    /// users are still admitted.
    #[instrument(skip(self, code))]
    pub async fn get_file_with_code(&self, path: &str, code: &str) -> Result<FileObject> {
        let query = [("code", code.to_string())];
        let sign = self.config.credentials.is_some();
        let response = self
            .request(Method::GET, &file_path(path), Some(&query), Vec::new(), None, sign)
            .await?;
        file_object(response).await
    }

    /// Delete a file (owner only)
    #[instrument(skip(self))]
    pub async fn delete_file(&self, path: &str) -> Result<()> {
        self.signed(Method::DELETE, &file_path(path), None, None).await?;
        Ok(())
    }

    /// Rename a file (owner only), replacing any file at `dest`
    #[instrument(skip(self))]
    pub async fn rename_file(&self, path: &str, dest: &str) -> Result<FileInfo> {
        let query = [("rename_to", dest.to_string())];
        let response = self
            .signed(Method::POST, &file_path(path), Some(&query), None)
            .await?;
        json(response).await
    }

    // ==================== Permissions ====================

    /// Current permission of a file (owner only)
    #[instrument(skip(self))]
    pub async fn permission(&self, path: &str) -> Result<FilePermission> {
        let response = self.signed(Method::GET, &perm_path(path), None, None).await?;
        json(response).await
    }

    /// Apply changes atomically and return the resulting permission (owner only)
    #[instrument(skip(self, changes))]
    pub async fn change_permission(
        &self,
        path: &str,
        changes: &[PermissionChange],
    ) -> Result<FilePermission> {
        let body = serde_json::to_vec(changes)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let response = self
            .signed(Method::POST, &perm_path(path), None, Some(body.into()))
            .await?;
        json(response).await
    }

    // ==================== Internal ====================

    fn url(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.config.base_url(), path))
            .map_err(|e| ClientError::Config(format!("invalid URL: {}", e)))
    }

    async fn signed(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push((header::CONTENT_TYPE.to_string(), "application/json".to_string()));
        }
        self.request(method, path, query, headers, body, true).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        headers: Vec<(String, String)>,
        body: Option<Bytes>,
        sign: bool,
    ) -> Result<Response> {
        let url = self.url(path)?;
        let mut req = self.http.request(method.clone(), url.clone());

        // Add query parameters
        if let Some(q) = query {
            req = req.query(q);
        }

        // Sign the percent-encoded path the gateway will see
        if sign {
            let credentials = self
                .config
                .credentials
                .as_ref()
                .ok_or_else(|| ClientError::Config("credentials required".to_string()))?;
            let date = http_date::now();
            let authorization = sign_request(&method, url.path(), credentials, &date)?;
            req = req
                .header(header::DATE, date)
                .header(header::AUTHORIZATION, authorization);
        }

        for (k, v) in headers {
            req = req.header(k, v);
        }

        if let Some(data) = body {
            req = req.body(data);
        }

        debug!("Sending {} request to {}", method, url.path());
        let response = req.send().await?;

        // Check for errors
        let status = response.status();
        if !status.is_success() {
            let header_code = response
                .headers()
                .get(ERROR_CODE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::from_json(
                &text,
                status.as_u16(),
                header_code.as_deref(),
            ));
        }

        Ok(response)
    }
}

fn file_path(path: &str) -> String {
    format!("/files/{}", path.trim_start_matches('/'))
}

fn perm_path(path: &str) -> String {
    format!("/perm/{}", path.trim_start_matches('/'))
}

async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

async fn file_object(response: Response) -> Result<FileObject> {
    let headers = response.headers();
    let owner = headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let meta = headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(META_HEADER_PREFIX)?;
            Some((key.to_string(), value.to_str().ok()?.to_string()))
        })
        .collect();
    let data = response.bytes().await?;

    Ok(FileObject { data, owner, meta })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_request_matches_verifier() {
        let credentials = Credentials::new("Sam", "password");
        let date = "Sun, 06 Nov 1994 08:49:37 GMT";
        let authorization = sign_request(&Method::GET, "/files/a.txt", &credentials, date).unwrap();

        let parts: Vec<&str> = authorization.split(' ').collect();
        assert_eq!(parts[0], "HMAC");
        assert_eq!(parts[1], "Sam");

        let message = signing_message("GET", "/files/a.txt", "Sam", date);
        assert!(tempdesk_crypto::verify(message.as_bytes(), parts[2], b"password"));
    }

    #[test]
    fn test_paths() {
        assert_eq!(file_path("/a/b.txt"), "/files/a/b.txt");
        assert_eq!(perm_path("a/b.txt"), "/perm/a/b.txt");
    }

    #[tokio::test]
    async fn test_signed_request_requires_credentials() {
        let client = DeskClient::with_endpoint("http://127.0.0.1:9").unwrap();
        match client.whoami().await {
            Err(ClientError::Config(message)) => assert_eq!(message, "credentials required"),
            other => panic!("expected configuration error, got {:?}", other.map(|p| p.name)),
        }
    }
}
