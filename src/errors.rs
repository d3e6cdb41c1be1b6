use crate::Value;
use std::fmt;

/// Boxed error returned by user supplied type conversions and actions
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error that can occur when scanning, configuring a parser, or parsing
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume the error and return the specific type of error
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns true if the error was raised while splitting the input into
    /// header fields
    pub fn is_scanner_error(&self) -> bool {
        matches!(
            *self.0,
            ErrorKind::MalformedHeader { .. }
                | ErrorKind::UnexpectedFolding { .. }
                | ErrorKind::ScannerExhausted
                | ErrorKind::InvalidSeparator(_)
        )
    }

    /// Returns true if the error was raised while mapping scanned fields
    /// onto the parser's field definitions
    pub fn is_parser_error(&self) -> bool {
        matches!(
            *self.0,
            ErrorKind::UnknownField { .. }
                | ErrorKind::DuplicateField { .. }
                | ErrorKind::MissingField { .. }
                | ErrorKind::InvalidChoice { .. }
                | ErrorKind::FieldType { .. }
                | ErrorKind::MissingBody
                | ErrorKind::BodyNotAllowed
                | ErrorKind::DuplicateBody
                | ErrorKind::Action(_)
        )
    }

    /// Returns true if the error was raised when defining a field
    pub fn is_definition_error(&self) -> bool {
        matches!(
            *self.0,
            ErrorKind::DuplicateName { .. }
                | ErrorKind::DuplicateDest { .. }
                | ErrorKind::RequiredWithDefault { .. }
                | ErrorKind::EmptyChoices
                | ErrorKind::ActionWithDest { .. }
                | ErrorKind::AdditionalWithDest
        )
    }

    /// Returns the name of the header field the error concerns (if available)
    pub fn field_name(&self) -> Option<&str> {
        self.0.field_name()
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// A non-blank line had neither leading whitespace nor a separator
    MalformedHeader { line: String },

    /// An indented line appeared without a preceding header line
    UnexpectedFolding { line: String },

    /// The scanner was asked for more data after all input was consumed
    ScannerExhausted,

    /// The separator pattern is not a valid regular expression
    InvalidSeparator(regex::Error),

    /// A field was encountered that was not defined and additional fields
    /// are not enabled
    UnknownField { name: String },

    /// A field not marked as multiple occurred more than once
    DuplicateField { name: String },

    /// A required field is not present in the input
    MissingField { name: String },

    /// A field value is not one of the field's allowed choices
    InvalidChoice { name: String, value: Value },

    /// The type conversion of a field failed
    FieldType {
        name: String,
        value: String,
        source: BoxError,
    },

    /// A body is required but the input has none
    MissingBody,

    /// A body is forbidden but the input has one
    BodyNotAllowed,

    /// The scanned event stream contained more than one body
    DuplicateBody,

    /// A field action failed
    Action(BoxError),

    /// A field name or alias is already used by another field
    DuplicateName { name: String },

    /// A field destination is already used by another field
    DuplicateDest { dest: String },

    /// A field was declared both required and with a default
    RequiredWithDefault { name: String },

    /// An empty set of choices was given
    EmptyChoices,

    /// A field was declared with both an action and a destination
    ActionWithDest { name: String },

    /// Additional fields and custom destinations were both requested
    AdditionalWithDest,
}

impl ErrorKind {
    pub fn field_name(&self) -> Option<&str> {
        match self {
            ErrorKind::UnknownField { name }
            | ErrorKind::DuplicateField { name }
            | ErrorKind::MissingField { name }
            | ErrorKind::InvalidChoice { name, .. }
            | ErrorKind::FieldType { name, .. }
            | ErrorKind::DuplicateName { name }
            | ErrorKind::RequiredWithDefault { name }
            | ErrorKind::ActionWithDest { name } => Some(name),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::InvalidSeparator(ref err) => Some(err),
            ErrorKind::FieldType { ref source, .. } => Some(source.as_ref()),
            ErrorKind::Action(ref err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::MalformedHeader { ref line } => {
                write!(f, "Invalid header line encountered: {:?}", line)
            }
            ErrorKind::UnexpectedFolding { ref line } => write!(
                f,
                "Indented line without preceding header line encountered: {:?}",
                line
            ),
            ErrorKind::ScannerExhausted => write!(f, "Scanner has reached end of input"),
            ErrorKind::InvalidSeparator(ref err) => write!(f, "invalid separator regex: {}", err),
            ErrorKind::UnknownField { ref name } => write!(f, "Unknown header field {:?}", name),
            ErrorKind::DuplicateField { ref name } => {
                write!(f, "Header field {:?} occurs more than once", name)
            }
            ErrorKind::MissingField { ref name } => {
                write!(f, "Required header field {:?} is not present", name)
            }
            ErrorKind::InvalidChoice {
                ref name,
                ref value,
            } => write!(f, "\"{}\" is not a valid choice for {:?}", value, name),
            ErrorKind::FieldType {
                ref name,
                ref value,
                ref source,
            } => write!(f, "Error while parsing {:?}: {:?}: {}", name, value, source),
            ErrorKind::MissingBody => write!(f, "Message body is required but missing"),
            ErrorKind::BodyNotAllowed => write!(f, "Message body is present but not allowed"),
            ErrorKind::DuplicateBody => write!(f, "Body appears twice in input"),
            ErrorKind::Action(ref err) => write!(f, "field action failed: {}", err),
            ErrorKind::DuplicateName { ref name } => {
                write!(f, "field defined more than once: {:?}", name)
            }
            ErrorKind::DuplicateDest { ref dest } => {
                write!(f, "destination defined more than once: {:?}", dest)
            }
            ErrorKind::RequiredWithDefault { ref name } => write!(
                f,
                "required and default are mutually exclusive (field {:?})",
                name
            ),
            ErrorKind::EmptyChoices => write!(f, "empty list supplied for choices"),
            ErrorKind::ActionWithDest { ref name } => write!(
                f,
                "`action` and `dest` are mutually exclusive (field {:?})",
                name
            ),
            ErrorKind::AdditionalWithDest => {
                write!(f, "add_additional and `dest` are mutually exclusive")
            }
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<regex::Error> for Error {
    fn from(error: regex::Error) -> Self {
        Error::new(ErrorKind::InvalidSeparator(error))
    }
}
