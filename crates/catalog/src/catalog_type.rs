use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use golden_core::{DomainError, DomainResult, Entity, ValueObject};

use crate::messages;

/// Maximum length of a description, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 100;

/// Form field name used for description validation errors.
pub const DESCRIPTION_FIELD: &str = "description";

/// Catalog type identifier, assigned by the remote catalog API.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogTypeId(i64);

impl CatalogTypeId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    /// Temporary identifier derived from the clock.
    ///
    /// Only used for a provisional entity when the remote create call succeeds
    /// without a payload; the next reload replaces it with the real id.
    pub fn provisional(now: DateTime<Utc>) -> Self {
        Self(now.timestamp_millis())
    }
}

impl core::fmt::Display for CatalogTypeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for CatalogTypeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for CatalogTypeId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("CatalogTypeId: {e}")))?;
        Ok(Self(raw))
    }
}

/// What the row action for a catalog type does, as presented to the user.
///
/// Both variants go through guarded removal; the label only reflects usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalAction {
    /// "Eliminar": the type is unused.
    Delete,
    /// "Desactivar": the type still classifies products.
    Deactivate,
}

impl RemovalAction {
    pub fn label(&self) -> &'static str {
        match self {
            RemovalAction::Delete => "Eliminar",
            RemovalAction::Deactivate => "Desactivar",
        }
    }
}

/// A catalog type as reported by the remote catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogType {
    pub id: CatalogTypeId,
    pub description: String,
    pub active: bool,
    /// Usage counter maintained by the remote system; never written by the client.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub number_of_products: u64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

impl CatalogType {
    pub fn is_in_use(&self) -> bool {
        self.number_of_products > 0
    }

    /// Row action offered for this type; inactive types offer none.
    pub fn removal_action(&self) -> Option<RemovalAction> {
        if !self.active {
            return None;
        }
        if self.is_in_use() {
            Some(RemovalAction::Deactivate)
        } else {
            Some(RemovalAction::Delete)
        }
    }

    /// Provisional copy of `self` with the submitted form values applied.
    pub fn merged_with(&self, input: &CatalogTypeInput) -> Self {
        Self {
            description: input.description.clone(),
            active: input.active,
            ..self.clone()
        }
    }

    /// Provisional entity for a create that returned no payload.
    pub fn provisional(input: &CatalogTypeInput, now: DateTime<Utc>) -> Self {
        Self {
            id: CatalogTypeId::provisional(now),
            description: input.description.clone(),
            active: input.active,
            number_of_products: 0,
        }
    }
}

impl Entity for CatalogType {
    type Id = CatalogTypeId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A validated description: trimmed, non-empty, at most
/// [`DESCRIPTION_MAX_LEN`] characters drawn from letters (including the
/// Latin-1 accented range `À`..=`ÿ`), digits, spaces, apostrophes and hyphens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(String);

impl ValueObject for Description {}

impl Description {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation(messages::DESCRIPTION_REQUIRED));
        }
        if raw.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(DomainError::validation(messages::DESCRIPTION_TOO_LONG));
        }
        if !raw.chars().all(is_allowed_char) {
            return Err(DomainError::validation(messages::DESCRIPTION_INVALID_CHARS));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, 'À'..='ÿ' | '\'' | ' ' | '-')
}

/// Values submitted by the create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTypeInput {
    pub description: String,
    pub active: bool,
}

impl Default for CatalogTypeInput {
    fn default() -> Self {
        Self {
            description: String::new(),
            active: true,
        }
    }
}

impl CatalogTypeInput {
    pub fn new(description: impl Into<String>, active: bool) -> Self {
        Self {
            description: description.into(),
            active,
        }
    }

    /// Form values pre-filled from an existing type.
    pub fn for_edit(item: &CatalogType) -> Self {
        Self {
            description: item.description.clone(),
            active: item.active,
        }
    }

    /// Validate and normalise the input (description trimmed).
    pub fn validated(&self) -> DomainResult<Self> {
        let description = Description::parse(&self.description)?;
        Ok(Self {
            description: description.into_inner(),
            active: self.active,
        })
    }
}
