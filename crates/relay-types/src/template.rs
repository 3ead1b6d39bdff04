//! Template identifiers.
//!
//! A [`TemplateId`] is the stem of a file in the template directory, so it
//! must never be able to name anything outside that directory.

use std::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Validated template file stem: 1..=128 characters of `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemplateId(String);

impl TemplateId {
    /// Length of identifiers produced by [`TemplateId::generate`].
    pub const GENERATED_LEN: usize = 8;
    pub const MAX_LEN: usize = 128;

    /// Validate a caller-supplied identifier.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let reject = |reason| TypesError::InvalidTemplateId {
            id: raw.to_owned(),
            reason,
        };
        if raw.is_empty() {
            return Err(reject("must not be empty"));
        }
        if raw.len() > Self::MAX_LEN {
            return Err(reject("longer than 128 characters"));
        }
        if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(reject("only letters, digits, '_' and '-' are allowed"));
        }
        Ok(Self(raw.to_owned()))
    }

    /// Fresh random identifier using the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    /// Draws [`Self::GENERATED_LEN`] symbols uniformly from the 62-symbol
    /// alphanumeric alphabet.
    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        let id = (0..Self::GENERATED_LEN)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name inside the template directory, always `<id>.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TemplateId {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TemplateId> for String {
    fn from(id: TemplateId) -> Self {
        id.0
    }
}
