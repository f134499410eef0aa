use std::borrow::Cow;

pub(crate) type Str<'a> = Cow<'a, str>;

pub mod client;
pub mod completion;
pub mod env;
pub mod error;
pub mod llm;

pub use client::Client;

pub mod prelude {
    use super::*;

    pub use client::{Client, ClientBuilder};

    pub use completion::Choice;
    pub use completion::Completion;

    pub use env::{DotEnv, Environment, ProcessEnv};

    pub use error::Error;
    pub use error::Result;

    pub use llm::Llm;
}

/// Completion text comes back with the model's leading newlines and trailing whitespace
pub(crate) mod serde_trim_string {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let text = String::deserialize(deserializer)?;
        let trimmed = text.trim();

        return match trimmed.len() == text.len() {
            true => Ok(text),
            false => Ok(trimmed.to_owned()),
        };
    }
}
