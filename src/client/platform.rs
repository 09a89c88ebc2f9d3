use crate::client::HttpSession;
use crate::collection::BuildContext;
use crate::errors::{check, ConnectError, PlatformError};
use crate::informatics::Catalog;
use crate::jobs::PollingConfig;
use crate::resources::ProjectCollection;
use crate::session::Session;
use crate::types::{AccessToken, ApiKey, PlatformUrl};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest_middleware::Middleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a ApiKey,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: AccessToken,
}

/// Client for a platform deployment.
#[derive(Clone)]
pub struct PlatformClient {
    session: Arc<dyn Session>,
    context: BuildContext,
    polling: PollingConfig,
}

pub struct PlatformClientBuilder {
    url: PlatformUrl,
    api_key: ApiKey,
    middleware: Vec<Arc<dyn Middleware>>,
    polling: PollingConfig,
    catalog: Option<Catalog>,
}

impl PlatformClientBuilder {
    /// Add middleware to the HTTP client.
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// How long to wait on jobs started through this client.
    pub fn polling(self, polling: PollingConfig) -> Self {
        Self { polling, ..self }
    }

    /// Use `catalog` instead of compiling the built-in one.
    pub fn catalog(self, catalog: Catalog) -> Self {
        Self {
            catalog: Some(catalog),
            ..self
        }
    }

    async fn access_token(&self) -> Result<AccessToken, ConnectError> {
        let client = reqwest::Client::new();
        let res = client
            .post(self.url.join("tokens/refresh"))
            .header(ACCEPT, "application/json")
            .json(&RefreshRequest {
                refresh_token: &self.api_key,
            })
            .send()
            .await?;
        let body: RefreshResponse = check(res).await?.json().await?;
        Ok(body.access_token)
    }

    /// Exchange the API key for an access token and connect to the platform.
    ///
    /// Fails if the module catalog does not compile.
    pub async fn connect(mut self) -> Result<PlatformClient, ConnectError> {
        let catalog = match self.catalog.take() {
            Some(catalog) => catalog,
            None => Catalog::builtin()?,
        };
        let token = self.access_token().await?;
        let client = reqwest::ClientBuilder::new()
            .default_headers(token2header(&token)?)
            .build()?;
        let client = self
            .middleware
            .into_iter()
            .fold(reqwest_middleware::ClientBuilder::new(client), |builder, m| builder.with_arc(m))
            .build();
        let session = HttpSession::new(client, self.url);
        Ok(PlatformClient {
            session: Arc::new(session),
            context: BuildContext::new(Arc::new(catalog)),
            polling: self.polling,
        })
    }
}

fn token2header(token: &AccessToken) -> Result<HeaderMap, PlatformError> {
    let mut headers = HeaderMap::new();
    let auth_data = format!("Bearer {}", token);
    let mut value = HeaderValue::from_str(&auth_data)
        .map_err(|e| PlatformError::UnexpectedResponse(format!("unusable access token: {}", e)))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

impl PlatformClient {
    /// Create a client builder.
    pub fn builder(url: PlatformUrl, api_key: ApiKey) -> PlatformClientBuilder {
        PlatformClientBuilder {
            url,
            api_key,
            middleware: Vec::new(),
            polling: PollingConfig::default(),
            catalog: None,
        }
    }

    /// A client over an existing session, e.g. one with custom transport.
    pub fn from_session(session: Arc<dyn Session>, catalog: Arc<Catalog>) -> Self {
        Self {
            session,
            context: BuildContext::new(catalog),
            polling: PollingConfig::default(),
        }
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.context.catalog
    }

    pub fn polling_config(&self) -> &PollingConfig {
        &self.polling
    }

    pub fn projects(&self) -> ProjectCollection {
        ProjectCollection::new(Arc::clone(&self.session), self.context.clone())
    }
}
