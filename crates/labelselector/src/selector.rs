use crate::{Labels, Requirement};
use std::{
    fmt::{self, Display},
    ops::Deref,
    str::FromStr,
};

/// Conjunction of requirements. Empty selector matches everything
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Selector(pub Vec<Requirement>);

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `push`
    pub fn add(mut self, requirement: Requirement) -> Self {
        self.0.push(requirement);
        self
    }

    pub fn push(&mut self, requirement: Requirement) {
        self.0.push(requirement)
    }

    pub fn matches<L: Labels + ?Sized>(&self, labels: &L) -> bool {
        self.0.iter().all(|r| r.matches(labels))
    }
}

impl From<Vec<Requirement>> for Selector {
    fn from(v: Vec<Requirement>) -> Self {
        Self(v)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, requirement) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", requirement)?;
        }
        Ok(())
    }
}

impl Deref for Selector {
    type Target = [Requirement];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for Selector {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        crate::parse(s)
    }
}
