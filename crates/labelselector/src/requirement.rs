use crate::{Error, Labels, Result};
use std::fmt::{self, Display};

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::In => "in",
            Self::NotIn => "notin",
            Self::Exists => "exists",
            Self::DoesNotExist => "!",
        })
    }
}

/// Single condition on one label key
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: Vec<String>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

/// `[a-zA-Z0-9]([-_.a-zA-Z0-9]*[a-zA-Z0-9])?`, empty string is not handled here
fn check_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.len() > MAX_NAME_LEN {
        return Err("must be no more than 63 characters");
    }
    if !name.chars().all(is_name_char) {
        return Err("must consist of alphanumeric characters, '-', '_' or '.'");
    }
    let first = name.chars().next();
    let last = name.chars().last();
    if !first.map_or(false, |c| c.is_ascii_alphanumeric())
        || !last.map_or(false, |c| c.is_ascii_alphanumeric())
    {
        return Err("must start and end with an alphanumeric character");
    }
    Ok(())
}

fn check_prefix(prefix: &str) -> std::result::Result<(), &'static str> {
    if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN {
        return Err("prefix must be a DNS subdomain of 1 to 253 characters");
    }
    for part in prefix.split('.') {
        let valid = !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !part.starts_with('-')
            && !part.ends_with('-');
        if !valid {
            return Err("prefix must be a lowercase RFC 1123 subdomain");
        }
    }
    Ok(())
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            check_prefix(prefix).map_err(|e| Error::InvalidKey(key.to_owned(), e))?;
            name
        }
        None => key,
    };
    if name.is_empty() {
        return Err(Error::InvalidKey(key.to_owned(), "name part must not be empty"));
    }
    check_name(name).map_err(|e| Error::InvalidKey(key.to_owned(), e))
}

pub(crate) fn validate_value(key: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    check_name(value).map_err(|e| Error::InvalidValue(value.to_owned(), key.to_owned(), e))
}

impl Requirement {
    /// Validating constructor, mirrors apimachinery `NewRequirement`
    pub fn new(
        key: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let key = key.into();
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        validate_key(&key)?;
        match operator {
            Operator::Equals | Operator::NotEquals if values.len() != 1 => {
                return Err(Error::ValueCount(operator, "exactly one value", values.len()))
            }
            Operator::In | Operator::NotIn if values.is_empty() => {
                return Err(Error::ValueCount(operator, "at least one value", 0))
            }
            Operator::Exists | Operator::DoesNotExist if !values.is_empty() => {
                return Err(Error::ValueCount(operator, "no values", values.len()))
            }
            _ => {}
        }
        for value in values.iter() {
            validate_value(&key, value)?;
        }
        values.sort();
        values.dedup();
        Ok(Self {
            key,
            operator,
            values,
        })
    }

    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::new(key, Operator::Equals, [value.into()])
    }
    pub fn not_equals(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::new(key, Operator::NotEquals, [value.into()])
    }
    pub fn exists(key: impl Into<String>) -> Result<Self> {
        Self::new(key, Operator::Exists, Vec::<String>::new())
    }
    pub fn does_not_exist(key: impl Into<String>) -> Result<Self> {
        Self::new(key, Operator::DoesNotExist, Vec::<String>::new())
    }

    pub fn key(&self) -> &str {
        &self.key
    }
    pub fn operator(&self) -> Operator {
        self.operator
    }
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn matches<L: Labels + ?Sized>(&self, labels: &L) -> bool {
        let found = labels.label(&self.key);
        match self.operator {
            Operator::Equals | Operator::In => {
                found.map_or(false, |v| self.values.iter().any(|want| want == v))
            }
            Operator::NotEquals | Operator::NotIn => {
                found.map_or(true, |v| self.values.iter().all(|want| want != v))
            }
            Operator::Exists => found.is_some(),
            Operator::DoesNotExist => found.is_none(),
        }
    }
}

impl Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Equals => write!(f, "{}={}", self.key, self.values[0]),
            Operator::NotEquals => write!(f, "{}!={}", self.key, self.values[0]),
            Operator::In | Operator::NotIn => {
                write!(f, "{} {} ({})", self.key, self.operator, self.values.join(","))
            }
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
        }
    }
}
