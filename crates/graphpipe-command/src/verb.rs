//! Supported command verbs.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A graph mutation the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Add a node with the given label.
    Add,
}

impl Verb {
    /// Every supported verb.
    pub const ALL: &'static [Verb] = &[Verb::Add];

    /// The token written on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Add => "add",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .iter()
            .copied()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownVerb(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_token() {
        assert_eq!("add".parse::<Verb>().unwrap(), Verb::Add);
        assert_eq!(Verb::Add.to_string(), "add");
    }

    #[test]
    fn rejects_unknown_and_miscased_verbs() {
        assert_eq!(
            "connect".parse::<Verb>().unwrap_err(),
            ValidationError::UnknownVerb("connect".to_string())
        );
        assert!("ADD".parse::<Verb>().is_err());
        assert!("".parse::<Verb>().is_err());
    }
}
