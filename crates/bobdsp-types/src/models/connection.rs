use regex::Regex;
use serde::{Deserialize, Serialize};

/// A rule linking output ports to input ports on the host's audio graph.
///
/// Rule order is meaningful to the host, so lists of rules are only ever
/// replaced or edited in place, never sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRule {
    #[serde(rename = "out")]
    pub out_pattern: String,
    #[serde(rename = "in")]
    pub in_pattern: String,
    /// Tear down existing connections from matching outputs that this rule does not produce
    #[serde(rename = "outdisconnect", default)]
    pub out_disconnect: bool,
    /// Tear down existing connections to matching inputs that this rule does not produce
    #[serde(rename = "indisconnect", default)]
    pub in_disconnect: bool,
}

impl ConnectionRule {
    pub fn new(out_pattern: impl Into<String>, in_pattern: impl Into<String>) -> Self {
        Self {
            out_pattern: out_pattern.into(),
            in_pattern: in_pattern.into(),
            out_disconnect: false,
            in_disconnect: false,
        }
    }

    /// Whether the output pattern matches the whole of `port`.
    pub fn matches_out(&self, port: &str) -> bool {
        full_match(&self.out_pattern, port)
    }

    /// Whether the input pattern matches the whole of `port`.
    pub fn matches_in(&self, port: &str) -> bool {
        full_match(&self.in_pattern, port)
    }

    /// Patterns that fail to compile, if any.
    pub fn invalid_patterns(&self) -> Vec<&str> {
        [self.out_pattern.as_str(), self.in_pattern.as_str()]
            .into_iter()
            .filter(|p| compile(p).is_none())
            .collect()
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).ok()
}

// an invalid pattern matches nothing
fn full_match(pattern: &str, port: &str) -> bool {
    compile(pattern).is_some_and(|re| re.is_match(port))
}
