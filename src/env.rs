//! Optional `.env` configuration.
//!
//! A [`DotEnv`] is parsed into an ordered list of pairs first, and only merged into an
//! [`Environment`] when the caller asks for it. Merging never overrides a variable that is
//! already defined.

use crate::error::Result;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Conventional name of the configuration file
pub const DEFAULT_FILENAME: &str = ".env";

/// A key/value table of environment variables
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
    fn set_var(&mut self, key: &str, value: &str);

    #[inline]
    fn contains(&self, key: &str) -> bool {
        self.var(key).is_some()
    }
}

/// The environment of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

/// Variables read from a configuration file
#[derive(Debug, Clone)]
pub struct DotEnv {
    path: PathBuf,
    vars: Vec<(String, String)>,
}

impl DotEnv {
    /// Searches `start` and each of its ancestors for a `.env` file
    pub fn find(start: impl AsRef<Path>) -> Option<PathBuf> {
        return start
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(DEFAULT_FILENAME))
            .find(|candidate| candidate.is_file());
    }

    /// Discovers a `.env` file starting at the current working directory.
    ///
    /// Returns `Ok(None)` if there is no such file.
    #[inline]
    pub fn discover() -> Result<Option<Self>> {
        return Self::discover_from(std::env::current_dir()?);
    }

    /// Discovers a `.env` file starting at `start`.
    ///
    /// Returns `Ok(None)` if there is no such file.
    pub fn discover_from(start: impl AsRef<Path>) -> Result<Option<Self>> {
        return match Self::find(start) {
            Some(path) => Self::from_path(path).map(Some),
            None => Ok(None),
        };
    }

    /// Reads the `KEY=VALUE` pairs of the file at `path`.
    ///
    /// Lines that cannot be parsed are skipped with a warning, the rest of the file is still read.
    /// Failing to read the file is an error.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        // the per-line iterator is the only way to keep going past a malformed line
        #[allow(deprecated)]
        let lines = dotenv::from_path_iter(&path)?;

        let mut vars = Vec::new();
        for line in lines {
            match line {
                Ok(pair) => vars.push(pair),
                Err(dotenv::Error::LineParse(_line, _index)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        path = %path.display(),
                        line = %_line,
                        index = _index,
                        "Skipping unparsable line"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), count = vars.len(), "Parsed configuration file");

        return Ok(Self { path, vars });
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn vars(&self) -> &[(String, String)] {
        &self.vars
    }

    /// Value of the first definition of `key` in the file
    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        return self
            .vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str());
    }

    /// Inserts every variable not yet defined in `env`, returning the keys that were inserted.
    pub fn merge_into<E: Environment + ?Sized>(&self, env: &mut E) -> Vec<&str> {
        let mut inserted = Vec::new();

        for (key, value) in &self.vars {
            if env.contains(key) {
                #[cfg(feature = "tracing")]
                tracing::trace!(key, "Variable already defined, skipping");
                continue;
            }

            env.set_var(key, value);
            inserted.push(key.as_str());
        }

        return inserted;
    }
}

/// Loads the closest `.env` file into the process environment, if there is one.
///
/// Returns the path of the loaded file.
pub fn load() -> Result<Option<PathBuf>> {
    let Some(dotenv) = DotEnv::discover()? else {
        return Ok(None);
    };

    let _inserted = dotenv.merge_into(&mut ProcessEnv);
    #[cfg(feature = "tracing")]
    tracing::debug!(
        path = %dotenv.path().display(),
        inserted = ?_inserted,
        "Loaded configuration file"
    );

    return Ok(Some(dotenv.path().to_path_buf()));
}

impl Environment for ProcessEnv {
    #[inline]
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    #[inline]
    fn set_var(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value)
    }

    #[inline]
    fn contains(&self, key: &str) -> bool {
        std::env::var_os(key).is_some()
    }
}

impl Environment for HashMap<String, String> {
    #[inline]
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }

    #[inline]
    fn set_var(&mut self, key: &str, value: &str) {
        self.insert(key.to_owned(), value.to_owned());
    }

    #[inline]
    fn contains(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}
