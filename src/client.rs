use crate::{
    env::{Environment, ProcessEnv},
    error::{Error, Result},
    Str,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    RequestBuilder,
};
use std::sync::Arc;

/// Variable holding the API key
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Variable holding the organization id
pub const ORGANIZATION_VAR: &str = "OPENAI_ORGANIZATION";
/// Variable overriding the API's base URL
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Authenticated handle to the OpenAI API
#[derive(Debug, Clone)]
pub struct Client {
    inner: reqwest::Client,
    base_url: Arc<str>,
}

/// [`Client`] builder
#[derive(Debug, Clone)]
pub struct ClientBuilder<'a> {
    api_key: Str<'a>,
    organization: Option<Str<'a>>,
    base_url: Option<Str<'a>>,
}

impl Client {
    /// Creates a new client.
    ///
    /// Any argument left as `None` is read from the process environment (`OPENAI_API_KEY` and
    /// `OPENAI_ORGANIZATION`). Fails with [`Error::MissingApiKey`] if no API key can be found.
    #[inline]
    pub fn new(api_key: Option<&str>, organization: Option<&str>) -> Result<Self> {
        return Self::resolve(api_key, organization, &ProcessEnv);
    }

    /// Creates a new client whose settings are read from `env`
    #[inline]
    pub fn from_env<E: Environment + ?Sized>(env: &E) -> Result<Self> {
        return Self::resolve(None, None, env);
    }

    /// Creates a client builder with an explicit API key
    #[inline]
    pub fn builder<'a>(api_key: impl Into<Str<'a>>) -> ClientBuilder<'a> {
        return ClientBuilder::new(api_key);
    }

    fn resolve<E: Environment + ?Sized>(
        api_key: Option<&str>,
        organization: Option<&str>,
        env: &E,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => Str::Borrowed(key),
            None => Str::Owned(env.var(API_KEY_VAR).ok_or(Error::MissingApiKey(API_KEY_VAR))?),
        };

        let mut builder = ClientBuilder::new(api_key);
        if let Some(organization) = organization
            .map(Str::Borrowed)
            .or_else(|| env.var(ORGANIZATION_VAR).map(Str::Owned))
        {
            builder = builder.organization(organization);
        }
        if let Some(base_url) = env.var(API_BASE_VAR) {
            builder = builder.base_url(base_url);
        }

        return builder.build();
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a `POST` request to `endpoint`, relative to the base URL
    #[inline]
    pub(crate) fn post(&self, endpoint: &str) -> RequestBuilder {
        return self.inner.post(self.url(endpoint));
    }

    fn url(&self, endpoint: &str) -> String {
        return format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
    }
}

impl<'a> ClientBuilder<'a> {
    #[inline]
    pub fn new(api_key: impl Into<Str<'a>>) -> Self {
        return Self {
            api_key: api_key.into(),
            organization: None,
            base_url: None,
        };
    }

    /// Organization the requests are billed to
    #[inline]
    pub fn organization(mut self, organization: impl Into<Str<'a>>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Base URL of the API (defaults to `https://api.openai.com/v1`)
    #[inline]
    pub fn base_url(mut self, base_url: impl Into<Str<'a>>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<Client> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(Error::MissingApiKey(API_KEY_VAR));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        if let Some(organization) = self.organization {
            headers.insert("OpenAI-Organization", HeaderValue::from_str(&organization)?);
        }

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base_url: Arc<str> = match self.base_url {
            Some(url) => Arc::from(&*url),
            None => Arc::from(DEFAULT_API_BASE),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(base_url = %base_url, "Client created");

        return Ok(Client { inner, base_url });
    }
}

impl AsRef<Client> for Client {
    #[inline]
    fn as_ref(&self) -> &Client {
        self
    }
}
