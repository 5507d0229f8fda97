//! Connection rule patterns built from concrete port names.
//!
//! A port name such as `eq2:output_1` is first escaped so it matches itself
//! literally, then optionally has the client instance number replaced with a
//! wildcard so the rule keeps working when the host renumbers duplicate
//! clients.

/// Characters that carry meaning in a connection rule pattern.
const METACHARACTERS: &[char] = &['.', '^', '$', '*', '+', '?', '(', ')', '[', ']', '{', '\\'];

/// Replaces a run of client-name digits.
pub const NUMBER_WILDCARD: &str = "[0-9]*";

/// Separates the client name from the port name.
const PORT_SEPARATOR: char = ':';

/// Prefixes every pattern metacharacter in `name` with a backslash.
pub fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len() * 2);
    for c in name.chars() {
        if METACHARACTERS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Replaces every digit run before the first `:` with [`NUMBER_WILDCARD`].
///
/// Digits from the first `:` onward belong to the port name and are copied
/// through untouched.
pub fn wildcard_numbers(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + NUMBER_WILDCARD.len());
    let mut in_number = false;
    let mut in_port_name = false;

    for c in name.chars() {
        if c == PORT_SEPARATOR {
            in_port_name = true;
        }

        if !in_port_name && c.is_ascii_digit() {
            in_number = true;
            continue;
        }

        if in_number {
            out.push_str(NUMBER_WILDCARD);
            in_number = false;
        }
        out.push(c);
    }

    if in_number {
        out.push_str(NUMBER_WILDCARD);
    }
    out
}

/// Builds a rule pattern for a selected port: escaped, then wildcarded when
/// `wildcard` is set.
pub fn build(port_name: &str, wildcard: bool) -> String {
    let escaped = escape(port_name);
    if wildcard {
        wildcard_numbers(&escaped)
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_metacharacters() {
        assert_eq!(escape("a.b*c"), r"a\.b\*c");
        assert_eq!(escape("x(1)[2]{3}"), r"x\(1\)\[2\]\{3}");
        assert_eq!(escape(r"^a+b?$\"), r"\^a\+b\?\$\\");
    }

    #[test]
    fn test_escape_passes_plain_text() {
        assert_eq!(escape("system:playback_1"), "system:playback_1");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_wildcard_keeps_port_name_digits() {
        assert_eq!(wildcard_numbers("drumgizmo:out_1"), "drumgizmo:out_1");
        assert_eq!(wildcard_numbers("client2:out_1"), "client[0-9]*:out_1");
    }

    #[test]
    fn test_wildcard_collapses_digit_runs() {
        assert_eq!(wildcard_numbers("eq12band3:in"), "eq[0-9]*band[0-9]*:in");
    }

    #[test]
    fn test_wildcard_trailing_digits_without_port() {
        assert_eq!(wildcard_numbers("client7"), "client[0-9]*");
        assert_eq!(wildcard_numbers("client42"), "client[0-9]*");
    }

    #[test]
    fn test_wildcard_after_escape_skips_backslashes() {
        let pattern = wildcard_numbers(&escape("bob.dsp2:out.1"));
        assert_eq!(pattern, r"bob\.dsp[0-9]*:out\.1");
    }

    #[test]
    fn test_build_toggles_wildcard() {
        assert_eq!(build("eq2:out_1", false), "eq2:out_1");
        assert_eq!(build("eq2:out_1", true), "eq[0-9]*:out_1");
    }

    #[test]
    fn test_escaped_pattern_matches_itself() {
        let name = "ladspa.eq(3):out+1";
        let re = regex::Regex::new(&format!("^(?:{})$", build(name, false))).unwrap_or_else(|e| {
            panic!("pattern should compile: {e}");
        });
        assert!(re.is_match(name));
    }
}
