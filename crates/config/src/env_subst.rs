/// Replace `${ENV_VAR}` and `${ENV_VAR:-default}` placeholders.
///
/// A variable that is unset (or set but empty, when a default is given)
/// takes the default. Unresolvable variables without a default are left
/// as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] with a custom lookup, so tests do not have to
/// touch the process environment.
pub fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next(); // consume '{'

        let mut inner = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            inner.push(c);
        }

        if !closed || inner.is_empty() {
            // Malformed, emit literal.
            result.push_str("${");
            result.push_str(&inner);
            if closed {
                result.push('}');
            }
            continue;
        }

        match inner.split_once(":-") {
            Some((name, default)) => match lookup(name).filter(|v| !v.is_empty()) {
                Some(value) => result.push_str(&value),
                None => result.push_str(default),
            },
            None => match lookup(&inner) {
                Some(value) => result.push_str(&value),
                None => {
                    result.push_str("${");
                    result.push_str(&inner);
                    result.push('}');
                },
            },
        }
    }

    result
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HUBLINK_TEST_VAR" => Some("hello".to_string()),
            "HUBLINK_EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[rstest]
    #[case("key=${HUBLINK_TEST_VAR}", "key=hello")]
    #[case("${HUBLINK_NONEXISTENT_XYZ}", "${HUBLINK_NONEXISTENT_XYZ}")]
    #[case("${HUBLINK_NONEXISTENT_XYZ:-fallback}", "fallback")]
    #[case("${HUBLINK_TEST_VAR:-fallback}", "hello")]
    #[case("${HUBLINK_EMPTY:-fallback}", "fallback")]
    #[case("${HUBLINK_NONEXISTENT_XYZ:-}", "")]
    #[case("url=${HOST:-ws://localhost:4521}/hub", "url=ws://localhost:4521/hub")]
    #[case("${HUBLINK_TEST_VAR}${HUBLINK_TEST_VAR}", "hellohello")]
    #[case("price: $5 and ${", "price: $5 and ${")]
    #[case("${unterminated", "${unterminated")]
    #[case("${}", "${}")]
    fn substitution(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(substitute_env_with(input, lookup), expected);
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
