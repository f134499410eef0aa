use super::{
    error::{BuilderError, FallibleResponse, Result},
    Str,
};
use crate::Client;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, ops::RangeInclusive};

const TEMPERATURE_RANGE: RangeInclusive<f64> = 0f64..=2f64;
const PENALTY_RANGE: RangeInclusive<f64> = -2f64..=2f64;

#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Choice {
    #[serde(with = "crate::serde_trim_string")]
    pub text: String,
    pub index: u64,
    #[serde(default)]
    pub logprobs: Option<Logprobs>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Logprobs {
    pub tokens: Vec<String>,
    pub token_logprobs: Vec<f64>,
    pub top_logprobs: Vec<HashMap<String, f64>>,
    pub text_offset: Vec<u64>,
}

/// Tokens billed for a request
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Usage {
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    pub total_tokens: u32,
}

/// Given a prompt, the model will return one or more predicted completions.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct Completion {
    pub id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// [`Completion`] request builder
#[derive(Debug, Clone, Serialize)]
pub struct CompletionBuilder<'a> {
    model: Str<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<Vec<Str<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suffix: Option<Str<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logprobs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    echo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<Str<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_of: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logit_bias: Option<HashMap<Str<'a>, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<Str<'a>>,
}

impl Completion {
    /// Creates a completion for the provided prompt
    #[inline]
    pub async fn new(
        model: impl AsRef<str>,
        prompt: impl AsRef<str>,
        client: impl AsRef<Client>,
    ) -> Result<Self> {
        return Self::builder(model.as_ref(), prompt.as_ref())
            .build(client)
            .await;
    }

    /// Creates a completion request builder
    #[inline]
    pub fn builder<'a>(
        model: impl Into<Str<'a>>,
        prompt: impl Into<Str<'a>>,
    ) -> CompletionBuilder<'a> {
        return CompletionBuilder::new(model).prompt([prompt]);
    }

    /// Returns a reference to the completion's first choice
    #[inline]
    pub fn first(&self) -> Option<&Choice> {
        return self.choices.first();
    }

    /// Returns the completion's first choice
    #[inline]
    pub fn into_first(self) -> Option<Choice> {
        return self.choices.into_iter().next();
    }
}

impl<'a> CompletionBuilder<'a> {
    /// Creates a new completion builder
    pub fn new(model: impl Into<Str<'a>>) -> Self {
        return Self {
            model: model.into(),
            prompt: None,
            suffix: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            n: None,
            logprobs: None,
            echo: None,
            frequency_penalty: None,
            presence_penalty: None,
            best_of: None,
            logit_bias: None,
            user: None,
            stop: None,
        };
    }

    /// The prompt(s) to generate completions for.
    ///
    /// If no prompt is specified the model will generate as if from the beginning of a new document.
    pub fn prompt<I: IntoIterator>(mut self, prompt: I) -> Self
    where
        I::Item: Into<Str<'a>>,
    {
        self.prompt = Some(prompt.into_iter().map(Into::into).collect());
        self
    }

    /// The suffix that comes after a completion of inserted text.
    pub fn suffix(mut self, suffix: impl Into<Str<'a>>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// The maximum number of tokens to generate in the completion.
    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// What sampling temperature to use, between 0 and 2.
    ///
    /// We generally recommend altering this or `top_p` but not both.
    pub fn temperature(mut self, temperature: f64) -> Result<Self, BuilderError<Self>> {
        return match TEMPERATURE_RANGE.contains(&temperature) {
            true => {
                self.temperature = Some(temperature);
                Ok(self)
            }
            false => Err(BuilderError::msg(
                self,
                format!("temperature out of range ({TEMPERATURE_RANGE:?})"),
            )),
        };
    }

    /// Nucleus sampling: only the tokens comprising the top `top_p` probability mass are considered.
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// How many completions to generate for each prompt.
    pub fn n(mut self, n: u64) -> Self {
        self.n = Some(n);
        self
    }

    /// Include the log probabilities on the `logprobs` most likely tokens. The maximum value is 5.
    pub fn logprobs(mut self, logprobs: u64) -> Result<Self, BuilderError<Self>> {
        const MAX: u64 = 5;
        match logprobs > MAX {
            true => Err(BuilderError::msg(
                self,
                format!("Exceeded maximum value of '{MAX}'"),
            )),
            false => {
                self.logprobs = Some(logprobs);
                Ok(self)
            }
        }
    }

    /// Echo back the prompt in addition to the completion
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = Some(echo);
        self
    }

    /// Up to 4 sequences where the API will stop generating further tokens.
    pub fn stop<I: IntoIterator>(mut self, stop: I) -> Result<Self, BuilderError<Self>>
    where
        I::Item: Into<Str<'a>>,
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

    /// Number between -2.0 and 2.0. Positive values penalize tokens that already appeared.
    pub fn presence_penalty(mut self, presence_penalty: f64) -> Result<Self, BuilderError<Self>> {
        return match PENALTY_RANGE.contains(&presence_penalty) {
            true => {
                self.presence_penalty = Some(presence_penalty);
                Ok(self)
            }
            false => Err(BuilderError::msg(
                self,
                format!("presence_penalty out of range ({PENALTY_RANGE:?})"),
            )),
        };
    }

    /// Number between -2.0 and 2.0. Positive values penalize tokens by how often they already appeared.
    pub fn frequency_penalty(mut self, frequency_penalty: f64) -> Result<Self, BuilderError<Self>> {
        return match PENALTY_RANGE.contains(&frequency_penalty) {
            true => {
                self.frequency_penalty = Some(frequency_penalty);
                Ok(self)
            }
            false => Err(BuilderError::msg(
                self,
                format!("frequency_penalty out of range ({PENALTY_RANGE:?})"),
            )),
        };
    }

    /// Generates `best_of` completions server-side and returns the one with the highest log probability per token.
    pub fn best_of(mut self, best_of: u64) -> Self {
        self.best_of = Some(best_of);
        self
    }

    /// Modify the likelihood of specified tokens (by token id) appearing in the completion.
    pub fn logit_bias<K, I>(mut self, logit_bias: I) -> Self
    where
        K: Into<Str<'a>>,
        I: IntoIterator<Item = (K, f64)>,
    {
        self.logit_bias = Some(logit_bias.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    /// A unique identifier representing your end-user.
    pub fn user(mut self, user: impl Into<Str<'a>>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sends the request
    pub async fn build(self, client: impl AsRef<Client>) -> Result<Completion> {
        #[cfg(feature = "tracing")]
        tracing::debug!(model = %self.model, "Sending completion request");

        let resp = client.as_ref().post("completions").json(&self).send().await?;
        let completion = FallibleResponse::<Completion>::from_response(resp).await?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            id = %completion.id,
            model = %completion.model,
            choices = completion.choices.len(),
            total_tokens = completion.usage.as_ref().map(|x| x.total_tokens),
            "Completion received"
        );

        return Ok(completion);
    }
}
