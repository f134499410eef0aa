use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::fmt::{Debug, Display};

pub type Result<T, E = Error> = ::core::result::Result<T, E>;

/// An error returned by a builder
#[derive(Debug)]
pub struct BuilderError<T> {
    pub builder: T,
    pub err: Error,
}

// An error of the `llm-oneshot` library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing API key: pass one explicitly or set `{0}`")]
    MissingApiKey(&'static str),
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAiError),
    #[error("Unexpected response ({status}): {body}")]
    Status { status: StatusCode, body: String },
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Dotenv error: {0}")]
    Dotenv(#[from] dotenv::Error),
    #[error("Invalid header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown error: {0}")]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum FallibleResponse<T> {
    Ok(T),
    Err { error: OpenAiError },
}

/// Error returned by an OpenAI API's endpoint
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct OpenAiError {
    pub message: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    /// HTTP status the error was delivered with
    #[serde(skip)]
    pub status: Option<u16>,
}

impl Error {
    #[inline]
    pub fn msg<M: Display + Debug + Send + Sync + 'static>(msg: M) -> Self {
        Self::Other(anyhow::Error::msg(msg))
    }

    /// Missing credential, or a credential the endpoint rejected
    pub fn is_authentication(&self) -> bool {
        return match self {
            Self::MissingApiKey(_) => true,
            Self::OpenAI(e) => e.is_authentication(),
            Self::Status { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        };
    }

    pub fn is_rate_limit(&self) -> bool {
        return match self {
            Self::OpenAI(e) => e.status == Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
            Self::Status { status, .. } => *status == StatusCode::TOO_MANY_REQUESTS,
            _ => false,
        };
    }

    /// The request never got an HTTP response back
    pub fn is_transport(&self) -> bool {
        return match self {
            Self::Reqwest(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        };
    }
}

impl OpenAiError {
    #[inline]
    pub fn is_authentication(&self) -> bool {
        return self.status == Some(StatusCode::UNAUTHORIZED.as_u16())
            || self.code.as_deref() == Some("invalid_api_key");
    }
}

impl<T> BuilderError<T> {
    #[inline]
    pub fn new(builder: T, error: impl Into<Error>) -> Self {
        return Self {
            builder,
            err: error.into(),
        };
    }

    #[inline]
    pub fn msg<M>(builder: T, msg: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        return Self {
            builder,
            err: Error::msg(msg),
        };
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.builder
    }

    #[inline]
    pub fn into_error(self) -> Error {
        self.err
    }
}

impl<T> FallibleResponse<T> {
    #[inline]
    pub fn into_result(self) -> Result<T, OpenAiError> {
        match self {
            FallibleResponse::Ok(x) => Ok(x),
            FallibleResponse::Err { error } => Err(error),
        }
    }
}

impl<T: DeserializeOwned> FallibleResponse<T> {
    /// Reads the whole body, keeping the status around so provider errors can be classified
    pub async fn from_response(resp: Response) -> Result<T> {
        let status = resp.status();
        let body = resp.bytes().await?;
        let parsed = serde_json::from_slice::<FallibleResponse<T>>(&body);

        if !status.is_success() {
            return match parsed {
                Ok(FallibleResponse::Err { mut error }) => {
                    error.status = Some(status.as_u16());
                    Err(Error::OpenAI(error))
                }
                _ => Err(Error::Status {
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                }),
            };
        }

        return Ok(parsed?.into_result()?);
    }
}

impl<T> From<BuilderError<T>> for Error {
    #[inline]
    fn from(value: BuilderError<T>) -> Self {
        value.into_error()
    }
}

impl Display for OpenAiError {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.message, f)
    }
}

impl<T> Display for BuilderError<T> {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.err, f)
    }
}

impl std::error::Error for OpenAiError {}
impl<T: Debug> std::error::Error for BuilderError<T> {}
