//! Value domains: the legal values of a variable.

use serde::{Deserialize, Serialize};

/// A legal value with an optional human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainValue {
    pub literal: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DomainValue {
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            description: None,
        }
    }

    pub fn described(literal: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            description: Some(description.into()),
        }
    }

    /// Parses `value[/description]`. An empty description counts as absent;
    /// fields after a second `/` are ignored.
    pub fn parse(pair: &str) -> Self {
        let mut fields = pair.split('/');
        let literal = fields.next().unwrap_or_default();
        match fields.next().filter(|d| !d.is_empty()) {
            Some(description) => Self::described(literal, description),
            None => Self::new(literal),
        }
    }
}

/// Ordered set of legal values for one variable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueDomain {
    values: Vec<DomainValue>,
}

impl ValueDomain {
    pub fn new(values: Vec<DomainValue>) -> Self {
        Self { values }
    }

    /// Parses a comma-separated list of `value[/description]` pairs.
    pub fn parse(text: &str) -> Self {
        Self {
            values: text.split(',').map(DomainValue::parse).collect(),
        }
    }

    /// Returns the first entry whose literal equals `literal`.
    pub fn find(&self, literal: &str) -> Option<&DomainValue> {
        self.values.iter().find(|v| v.literal == literal)
    }

    pub fn contains(&self, literal: &str) -> bool {
        self.find(literal).is_some()
    }

    /// Resolves the description of `value` for variable `name`.
    ///
    /// Returns `None` if `value` is not part of the domain. A literal
    /// without description resolves to `name=value`.
    pub fn describe(&self, name: &str, value: &str) -> Option<String> {
        self.find(value).map(|v| match &v.description {
            Some(description) => description.clone(),
            None => format!("{}={}", name, value),
        })
    }

    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.literal.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<DomainValue> for ValueDomain {
    fn from_iter<I: IntoIterator<Item = DomainValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let domain = ValueDomain::parse("red/Like a rose,green,blue/");
        assert_eq!(domain.len(), 3);
        assert_eq!(
            domain.find("red"),
            Some(&DomainValue::described("red", "Like a rose"))
        );
        assert_eq!(domain.find("green"), Some(&DomainValue::new("green")));
        assert_eq!(domain.find("blue"), Some(&DomainValue::new("blue")));
        assert!(domain.find("yellow").is_none());
    }

    #[test]
    fn test_parse_ignores_extra_slash_fields() {
        assert_eq!(
            DomainValue::parse("red/Like a rose/unused"),
            DomainValue::described("red", "Like a rose")
        );
        assert_eq!(DomainValue::parse("red//unused"), DomainValue::new("red"));
    }

    #[test]
    fn test_describe_falls_back_to_assignment() {
        let domain = ValueDomain::parse("red/Like a rose,green");
        assert_eq!(
            domain.describe("color", "red").as_deref(),
            Some("Like a rose")
        );
        assert_eq!(
            domain.describe("color", "green").as_deref(),
            Some("color=green")
        );
        assert_eq!(domain.describe("color", "pink"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let domain = ValueDomain::parse("on/first,on/second");
        assert_eq!(domain.describe("x", "on").as_deref(), Some("first"));
    }

    #[test]
    fn test_literal_comparison_is_exact() {
        let domain = ValueDomain::parse("Red");
        assert!(domain.contains("Red"));
        assert!(!domain.contains("red"));
        assert!(!domain.contains("Red "));
    }

    #[test]
    fn test_literals_order() {
        let domain: ValueDomain = ["c", "a", "b"].into_iter().map(DomainValue::new).collect();
        assert_eq!(domain.literals().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_json_shape() {
        let domain = ValueDomain::parse("red/Like a rose,green");
        let json = serde_json::to_value(&domain).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"literal": "red", "description": "Like a rose"},
                {"literal": "green"}
            ])
        );
    }
}
