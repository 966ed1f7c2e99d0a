use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Problems with launch parameters, detected when a step starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Missing job parameter: {0}")]
    Missing(String),

    #[error("Invalid job parameter {key}={value}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Malformed parameter argument (expected key=value): {0}")]
    Malformed(String),
}

/// Launch parameters of a job
///
/// Values stay raw strings until a step asks for them, so one job definition
/// serves any partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobParameters {
    values: BTreeMap<String, String>,
}

impl JobParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Parse `key=value` launch arguments
    pub fn from_args<I, A>(args: I) -> Result<Self, ParameterError>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        let mut params = Self::new();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| ParameterError::Malformed(arg.to_string()))?;
            params
                .values
                .insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, ParameterError> {
        self.get(key)
            .ok_or_else(|| ParameterError::Missing(key.to_string()))
    }

    /// Required `YYYY-MM-DD` date parameter
    pub fn date(&self, key: &str) -> Result<NaiveDate, ParameterError> {
        let value = self.require(key)?;
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| ParameterError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for JobParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}
