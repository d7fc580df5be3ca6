use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{
    format_description::well_known::Iso8601, Date, OffsetDateTime, PrimitiveDateTime, Time,
};

use crate::errors::ModelError;

/// Grouping key used when the operator file is a flat array.
pub const DEFAULT_GROUP: &str = "default";

/// Desired fee grant state for one operator, together with the last observed on-chain limit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantDesiredState {
    /// Whether a grant should exist at all.
    #[serde(default)]
    pub enabled: bool,
    /// Desired per-period spend cap.
    #[serde(default)]
    pub period_spend_limit: u64,
    /// Cap currently granted on-chain (0 when no grant is active).
    #[serde(default)]
    pub active_period_spend_limit: u64,
    /// Desired expiration; `None` means the grant never expires.
    #[serde(default)]
    pub expiration: Option<Expiration>,
}

/// A relayer operator account as listed in the operator file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRecord {
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub feegrant: GrantDesiredState,
}

/// Expiration timestamp of a grant.
///
/// The raw text is kept so it can be handed back to the chain daemon exactly as configured.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Expiration {
    raw: String,
    at: OffsetDateTime,
}

impl Expiration {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let trimmed = raw.trim().trim_end_matches('Z');
        let at = parse_timestamp(trimmed)
            .ok_or_else(|| ModelError::InvalidExpiration(raw.to_string()))?;
        Ok(Self { raw: raw.to_string(), at })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn at(&self) -> OffsetDateTime {
        self.at
    }

    /// Strictly before `now`; an expiration equal to `now` is still valid.
    pub fn is_past(&self, now: OffsetDateTime) -> bool {
        self.at < now
    }
}

fn parse_timestamp(s: &str) -> Option<OffsetDateTime> {
    parse_iso8601(s).or_else(|| {
        // `YYYY-MM-DD HH:MM:SS`: a space in place of the `T` separator.
        match s.get(10..11) {
            Some(" ") => parse_iso8601(&format!("{}T{}", &s[..10], &s[11..])),
            _ => None,
        }
    })
}

fn parse_iso8601(s: &str) -> Option<OffsetDateTime> {
    if let Ok(at) = OffsetDateTime::parse(s, &Iso8601::DEFAULT) {
        return Some(at);
    }
    if let Ok(at) = PrimitiveDateTime::parse(s, &Iso8601::DEFAULT) {
        return Some(at.assume_utc());
    }
    Date::parse(s, &Iso8601::DEFAULT)
        .ok()
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

impl TryFrom<String> for Expiration {
    type Error = ModelError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Expiration::parse(&raw)
    }
}

impl From<Expiration> for String {
    fn from(expiration: Expiration) -> Self {
        expiration.raw
    }
}

/// Operators listed under one grouping key (e.g. an IBC path).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorGroup {
    pub key: String,
    pub operators: Vec<OperatorRecord>,
}

/// The whole operator file, groups in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperatorSet {
    pub groups: Vec<OperatorGroup>,
}

impl OperatorSet {
    /// Parse an operator file that is either a flat array of operators or an object of
    /// grouping key -> array of operators.
    pub fn from_json_str(s: &str) -> Result<Self, ModelError> {
        let root: Value = serde_json::from_str(s)?;
        match root {
            Value::Object(map) => Self::from_grouped(map),
            list @ Value::Array(_) => Ok(Self {
                groups: vec![OperatorGroup {
                    key: DEFAULT_GROUP.to_string(),
                    operators: serde_json::from_value(list)?,
                }],
            }),
            _ => Err(ModelError::UnexpectedLayout),
        }
    }

    fn from_grouped(map: Map<String, Value>) -> Result<Self, ModelError> {
        let mut groups = Vec::with_capacity(map.len());
        for (key, operators) in map {
            let operators = serde_json::from_value(operators)
                .map_err(|source| ModelError::Group { key: key.clone(), source })?;
            groups.push(OperatorGroup { key, operators });
        }
        Ok(Self { groups })
    }

    /// All records in iteration order: groups in file order, records in list order.
    pub fn iter(&self) -> impl Iterator<Item = &OperatorRecord> {
        self.groups.iter().flat_map(|g| g.operators.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OperatorRecord> {
        self.groups.iter_mut().flat_map(|g| g.operators.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.operators.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
