//! Ready-made value conversions for use with [`Field::with_type`](crate::Field::with_type)
//! and the `unfold` helper applied by fields declared with
//! [`Field::unfold`](crate::Field::unfold).

use crate::{BoxError, Value};
use regex::Regex;
use std::error;
use std::fmt;
use std::sync::OnceLock;

const TRUTHY: [&str; 5] = ["yes", "y", "on", "true", "1"];
const FALSEY: [&str; 5] = ["no", "n", "off", "false", "0"];

/// An error that can occur when converting a field value into the requested type.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    /// The given string was not a recognized boolean value
    InvalidBool(String),

    /// The given string was not a base 10 integer that fits in an i64
    InvalidInteger(String),
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueError::InvalidBool(x) => write!(f, "invalid boolean: {:?}", x),
            ValueError::InvalidInteger(x) => write!(f, "invalid integer: {:?}", x),
        }
    }
}

impl error::Error for ValueError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

/// Convert a boolean-like string to a `bool`.
///
/// `yes`, `y`, `on`, `true`, and `1` are true; `no`, `n`, `off`, `false`,
/// and `0` are false. Case and surrounding whitespace are ignored.
///
/// ```
/// use headerparser::types::{parse_bool, ValueError};
/// assert_eq!(parse_bool(" Yes "), Ok(true));
/// assert_eq!(parse_bool("off"), Ok(false));
/// assert_eq!(parse_bool("maybe"), Err(ValueError::InvalidBool(String::from("maybe"))));
/// ```
pub fn parse_bool(s: &str) -> Result<bool, ValueError> {
    let b = s.trim().to_lowercase();
    if TRUTHY.contains(&b.as_str()) {
        Ok(true)
    } else if FALSEY.contains(&b.as_str()) {
        Ok(false)
    } else {
        Err(ValueError::InvalidBool(String::from(s)))
    }
}

/// Field type conversion producing a [`Value::Bool`] via [`parse_bool`]
pub fn boolean(s: &str) -> Result<Value, BoxError> {
    Ok(Value::Bool(parse_bool(s)?))
}

/// Field type conversion producing a [`Value::Integer`]. Surrounding
/// whitespace is ignored.
pub fn integer(s: &str) -> Result<Value, BoxError> {
    s.trim()
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| ValueError::InvalidInteger(String::from(s)).into())
}

/// Field type conversion that lowercases the value
pub fn lower(s: &str) -> Result<Value, BoxError> {
    Ok(Value::String(s.to_lowercase()))
}

fn fold_regex() -> &'static Regex {
    static FOLD: OnceLock<Regex> = OnceLock::new();
    FOLD.get_or_init(|| Regex::new(r"[ \t]*[\r\n][ \t\r\n]*").expect("fold pattern is valid"))
}

/// Remove folding whitespace from a string by converting line breaks (and
/// any whitespace adjacent to line breaks) to a single space and removing
/// leading and trailing spaces.
///
/// ```
/// use headerparser::types::unfold;
/// assert_eq!(unfold("This is a \n folded string.\n"), "This is a folded string.");
/// ```
pub fn unfold(s: &str) -> String {
    let collapsed = fold_regex().replace_all(s, " ");
    String::from(collapsed.trim_matches(' '))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::*;

    #[rstest]
    #[case("yes", true)]
    #[case("Y", true)]
    #[case(" on", true)]
    #[case("TRUE", true)]
    #[case("1", true)]
    #[case("no", false)]
    #[case("N ", false)]
    #[case("Off", false)]
    #[case("false", false)]
    #[case("0", false)]
    fn test_parse_bool(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(parse_bool(input), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("maybe")]
    #[case("2")]
    #[case("yes please")]
    fn test_parse_bool_invalid(#[case] input: &str) {
        assert_eq!(
            parse_bool(input),
            Err(ValueError::InvalidBool(String::from(input)))
        );
    }

    #[test]
    fn test_integer() {
        assert_eq!(integer(" 42 ").unwrap(), Value::Integer(42));
        assert_eq!(integer("-7").unwrap(), Value::Integer(-7));
        let err = integer("4x").unwrap_err();
        assert_eq!(err.to_string(), "invalid integer: \"4x\"");
    }

    #[test]
    fn test_lower() {
        assert_eq!(lower("RED").unwrap(), Value::from("red"));
    }

    #[rstest]
    #[case("some value", "some value")]
    #[case("some\nvalue", "some value")]
    #[case("some\n value", "some value")]
    #[case(" some value", "some value")]
    #[case("\nsome value", "some value")]
    #[case(" \nsome value", "some value")]
    #[case("\n some value", "some value")]
    #[case("some value ", "some value")]
    #[case("some value\n", "some value")]
    #[case("some value \n", "some value")]
    #[case("some value\n ", "some value")]
    #[case("some\r\n\tvalue", "some value")]
    #[case("some  \n \n  value", "some value")]
    #[case("some\t value", "some\t value")]
    #[case("\n", "")]
    fn test_unfold(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unfold(input), expected);
    }

    #[quickcheck]
    fn unfold_is_idempotent(data: String) -> bool {
        let once = unfold(&data);
        unfold(&once) == once
    }

    #[quickcheck]
    fn unfold_removes_line_breaks(data: String) -> bool {
        !unfold(&data).contains(['\r', '\n'])
    }
}
