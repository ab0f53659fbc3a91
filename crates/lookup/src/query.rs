use serde::{Deserialize, Serialize};

/// A key lookup: either key, or both.
///
/// Keys are given as typed by the caller; they are normalized the same way
/// the index was before being resolved. A blank key counts as not given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyQuery {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
}

impl KeyQuery {
    pub fn primary(key: impl Into<String>) -> Self {
        Self { primary: Some(key.into()), secondary: None }
    }

    pub fn secondary(key: impl Into<String>) -> Self {
        Self { primary: None, secondary: Some(key.into()) }
    }

    pub fn both(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self { primary: Some(primary.into()), secondary: Some(secondary.into()) }
    }
}

/// Parse `PRIMARY:SECONDARY`, `PRIMARY:`, `:SECONDARY` or a bare `PRIMARY`.
impl From<&str> for KeyQuery {
    fn from(s: &str) -> Self {
        let (primary, secondary) = s.split_once(':').unwrap_or((s, ""));
        let given = |k: &str| Some(k.trim().to_string()).filter(|k| !k.is_empty());
        Self {
            primary: given(primary),
            secondary: given(secondary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AB12:V1", KeyQuery::both("AB12", "V1"))]
    #[case("AB12", KeyQuery::primary("AB12"))]
    #[case("AB12:", KeyQuery::primary("AB12"))]
    #[case(":V1", KeyQuery::secondary("V1"))]
    #[case(" : ", KeyQuery::default())]
    fn test_from_str(#[case] input: &str, #[case] expected: KeyQuery) {
        assert_eq!(KeyQuery::from(input), expected);
    }
}
