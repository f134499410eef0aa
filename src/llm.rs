use crate::{
    completion::{Completion, CompletionBuilder},
    error::{BuilderError, Error, Result},
    Client,
};
use std::ops::RangeInclusive;

/// A completion model bound to a [`Client`], with its sampling parameters.
///
/// Every call to [`Llm::complete`] performs exactly one request; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Llm {
    client: Client,
    model: String,
    temperature: f64,
    max_tokens: u64,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
    n: u64,
    best_of: u64,
    stop: Option<Vec<String>>,
}

impl Llm {
    pub const DEFAULT_MODEL: &'static str = "text-davinci-003";

    /// Binds `model` to `client` with the default sampling parameters
    pub fn new(model: impl Into<String>, client: Client) -> Self {
        return Self {
            client,
            model: model.into(),
            temperature: 0.7,
            max_tokens: 256,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            n: 1,
            best_of: 1,
            stop: None,
        };
    }

    /// Binds `model` to a client configured from the process environment
    #[inline]
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        return Ok(Self::new(model, Client::new(None, None)?));
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sampling temperature, between 0 and 2
    pub fn temperature(mut self, temperature: f64) -> Result<Self, BuilderError<Self>> {
        const RANGE: RangeInclusive<f64> = 0f64..=2f64;
        if !RANGE.contains(&temperature) {
            return Err(BuilderError::msg(
                self,
                format!("temperature out of range ({RANGE:?})"),
            ));
        }
        self.temperature = temperature;
        return Ok(self);
    }

    /// Maximum number of tokens to generate
    #[inline]
    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[inline]
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn frequency_penalty(mut self, frequency_penalty: f64) -> Result<Self, BuilderError<Self>> {
        match check_penalty("frequency_penalty", frequency_penalty) {
            Ok(()) => {
                self.frequency_penalty = frequency_penalty;
                Ok(self)
            }
            Err(msg) => Err(BuilderError::msg(self, msg)),
        }
    }

    pub fn presence_penalty(mut self, presence_penalty: f64) -> Result<Self, BuilderError<Self>> {
        match check_penalty("presence_penalty", presence_penalty) {
            Ok(()) => {
                self.presence_penalty = presence_penalty;
                Ok(self)
            }
            Err(msg) => Err(BuilderError::msg(self, msg)),
        }
    }

    #[inline]
    pub fn n(mut self, n: u64) -> Self {
        self.n = n;
        self
    }

    #[inline]
    pub fn best_of(mut self, best_of: u64) -> Self {
        self.best_of = best_of;
        self
    }

    /// Up to 4 sequences where generation stops
    pub fn stop<I: IntoIterator>(mut self, stop: I) -> Result<Self, BuilderError<Self>>
    where
        I::Item: Into<String>,
    {
        const MAX_SIZE: usize = 4;

        let mut result = Vec::with_capacity(MAX_SIZE);
        for next in stop {
            if result.len() == MAX_SIZE {
                return Err(BuilderError::msg(
                    self,
                    format!("Iterator exceeds size limit of {MAX_SIZE}"),
                ));
            }
            result.push(next.into());
        }

        self.stop = Some(result);
        return Ok(self);
    }

    /// Request body for `prompt`, carrying every sampling parameter explicitly
    pub fn request<'a>(&'a self, prompt: &'a str) -> Result<CompletionBuilder<'a>> {
        let mut builder = Completion::builder(self.model.as_str(), prompt)
            .max_tokens(self.max_tokens)
            .top_p(self.top_p)
            .n(self.n)
            .best_of(self.best_of)
            .temperature(self.temperature)?
            .frequency_penalty(self.frequency_penalty)?
            .presence_penalty(self.presence_penalty)?;

        if let Some(stop) = &self.stop {
            builder = builder.stop(stop.iter().map(String::as_str))?;
        }

        return Ok(builder);
    }

    /// Sends `prompt` to the model and returns the text of the top completion
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let completion = self.request(prompt)?.build(&self.client).await?;

        return completion
            .into_first()
            .map(|choice| choice.text)
            .ok_or_else(|| Error::msg("No choices found"));
    }
}

fn check_penalty(name: &str, value: f64) -> Result<(), String> {
    const RANGE: RangeInclusive<f64> = -2f64..=2f64;
    return match RANGE.contains(&value) {
        true => Ok(()),
        false => Err(format!("{name} out of range ({RANGE:?})")),
    };
}
