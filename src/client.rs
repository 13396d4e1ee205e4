use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::structs::{IzError, UserData};

/// Production API endpoint.
pub const BASE_URL: &str = "https://imagezebra.com/api";

/// Application key plus one user account, as issued with an API subscription.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub application_key: String,
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Authenticated client for the ImageZebra API.
///
/// Authenticates once at construction and keeps the bearer token for its
/// whole lifetime; every request issued through the verb methods carries it
/// together with the application key.
#[derive(Debug, Clone)]
pub struct IzClient {
    http: Client,
    base_url: String,
    token: String,
}

impl IzClient {
    /// Authenticates against the production endpoint.
    ///
    /// # Arguments
    ///
    /// * `credentials` - The application key and user account to sign in with.
    ///
    /// # Returns
    ///
    /// * A Result wrapping an authenticated client, or [IzError::Authentication]
    ///   when the service rejects the credentials.
    pub async fn connect(credentials: &Credentials) -> Result<Self, IzError> {
        Self::connect_with_url(BASE_URL, credentials).await
    }

    /// Authenticates against a specific endpoint, e.g. a staging deployment.
    pub async fn connect_with_url(
        base_url: &str,
        credentials: &Credentials,
    ) -> Result<Self, IzError> {
        let mut app_key = header::HeaderValue::from_str(&credentials.application_key)?;
        app_key.set_sensitive(true);

        let response = Client::builder()
            .build()?
            .post(format!("{}/token", base_url))
            .header("X-Application-Key", app_key.clone())
            .json(&TokenRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = decode_error_body(response).await;
            return Err(IzError::Authentication { status, body });
        }
        let token: TokenResponse = response.json().await?;

        let mut headers = header::HeaderMap::new();
        let mut bearer = header::HeaderValue::from_str(&format!("Bearer {}", token.token))?;
        bearer.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert("X-Application-Key", app_key);

        let http = Client::builder().default_headers(headers).build()?;

        debug!("authenticated against {}", base_url);

        Ok(IzClient {
            http,
            base_url: base_url.to_string(),
            token: token.token,
        })
    }

    /// The bearer token obtained at construction.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Starts an authenticated request to an API path. Headers or query
    /// parameters added on the builder are merged over the stored auth
    /// headers. Pass the builder to [dispatch](Self::dispatch) to execute it.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Executes a request built with [request](Self::request) and decodes the
    /// response.
    ///
    /// # Returns
    ///
    /// * `Ok(Value::Null)` on a 204 response.
    /// * The decoded JSON body on any other success status.
    /// * [IzError::Api] on a non-success status, carrying the decoded JSON
    ///   error body when the response has one, an empty object otherwise.
    pub async fn dispatch(&self, request: RequestBuilder) -> Result<Value, IzError> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = decode_error_body(response).await;
        Err(IzError::Api { status, body })
    }

    pub async fn get(&self, path: &str) -> Result<Value, IzError> {
        self.dispatch(self.request(Method::GET, path)).await
    }

    pub async fn post(&self, path: &str) -> Result<Value, IzError> {
        self.dispatch(self.request(Method::POST, path)).await
    }

    pub async fn post_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Value, IzError> {
        self.dispatch(self.request(Method::POST, path).query(query))
            .await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, IzError> {
        self.dispatch(self.request(Method::POST, path).json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, IzError> {
        self.dispatch(self.request(Method::DELETE, path)).await
    }

    /// Fetches the account's subscription tier and remaining analysis balance.
    pub async fn user_data(&self) -> Result<UserData, IzError> {
        let value = self.get("/user-data").await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// API errors usually carry a JSON body with details worth surfacing to the
/// caller (validation problems, status messages). Fall back to an empty
/// object when the body is not valid JSON.
async fn decode_error_body(response: Response) -> Value {
    response
        .json()
        .await
        .unwrap_or_else(|_| Value::Object(Default::default()))
}
