use regex::Regex;

/// Classification of a single input line, with the line terminator removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Line starts with a space or tab and extends the open field
    Continuation(&'a str),

    /// Line contains the separator; `name` is the text before the match and
    /// `value` the text after it
    Field { name: &'a str, value: &'a str },

    /// Empty line, ending the header section
    Blank,

    /// Non-blank line that is neither a continuation nor a field
    Malformed(&'a str),
}

/// Strip all trailing CR and LF characters from a line
#[inline]
pub(crate) fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Classify one line of a header section. The separator is searched for
/// anywhere in the line and the first match wins.
pub fn classify<'a>(line: &'a str, separator: &Regex) -> LineClass<'a> {
    let line = strip_terminator(line);
    if line.starts_with([' ', '\t']) {
        LineClass::Continuation(line)
    } else if let Some(m) = separator.find(line) {
        LineClass::Field {
            name: &line[..m.start()],
            value: &line[m.end()..],
        }
    } else if line.is_empty() {
        LineClass::Blank
    } else {
        LineClass::Malformed(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn sep() -> Regex {
        Regex::new(r"[ \t]*:[ \t]*").unwrap()
    }

    #[rstest]
    #[case("Foo: red\n", LineClass::Field { name: "Foo", value: "red" })]
    #[case("Foo :red\r\n", LineClass::Field { name: "Foo", value: "red" })]
    #[case("Foo:", LineClass::Field { name: "Foo", value: "" })]
    #[case("Foo: red : crimson", LineClass::Field { name: "Foo", value: "red : crimson" })]
    #[case("Trailing: value  \n", LineClass::Field { name: "Trailing", value: "value  " })]
    #[case(": value", LineClass::Field { name: "", value: "value" })]
    #[case("  folded\n", LineClass::Continuation("  folded"))]
    #[case("\tKey: value", LineClass::Continuation("\tKey: value"))]
    #[case(" ", LineClass::Continuation(" "))]
    #[case("\n", LineClass::Blank)]
    #[case("\r\n", LineClass::Blank)]
    #[case("", LineClass::Blank)]
    #[case("Bar green\n", LineClass::Malformed("Bar green"))]
    fn test_classify(#[case] line: &str, #[case] expected: LineClass) {
        assert_eq!(classify(line, &sep()), expected);
    }

    #[test]
    fn test_custom_separator() {
        let sep = Regex::new(r"\s*=\s*").unwrap();
        assert_eq!(
            classify("Key: Value = foo", &sep),
            LineClass::Field {
                name: "Key: Value",
                value: "foo"
            }
        );
        assert_eq!(
            classify("Bar: green", &sep),
            LineClass::Malformed("Bar: green")
        );
    }
}
