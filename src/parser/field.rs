use crate::{BoxError, Error, ErrorKind, NormalizedDict, Value};
use std::fmt;
use std::sync::Arc;

/// Conversion applied to a field value after unfolding
pub type TypeFn = Arc<dyn Fn(&str) -> Result<Value, BoxError> + Send + Sync>;

/// Callback invoked with the record being built, the field name, and the
/// processed value, in place of storing the value
pub type ActionFn =
    Arc<dyn Fn(&mut NormalizedDict, &str, Value) -> Result<(), BoxError> + Send + Sync>;

/// Processing options shared by named fields and additional fields
#[derive(Clone, Default)]
pub(crate) struct FieldDef {
    pub(crate) value_type: Option<TypeFn>,
    pub(crate) multiple: bool,
    pub(crate) unfold: bool,
    pub(crate) choices: Option<Vec<Value>>,
    pub(crate) action: Option<ActionFn>,
}

impl FieldDef {
    fn validate(&self) -> Result<(), Error> {
        match self.choices {
            Some(ref choices) if choices.is_empty() => Err(Error::new(ErrorKind::EmptyChoices)),
            _ => Ok(()),
        }
    }

    /// Unfold, convert, and check a raw value against the choices
    pub(crate) fn prepare(&self, name: &str, raw: String) -> Result<Value, Error> {
        let raw = if self.unfold {
            crate::types::unfold(&raw)
        } else {
            raw
        };

        let value = match self.value_type {
            Some(ref convert) => convert(&raw).map_err(|source| field_type_error(name, raw, source))?,
            None => Value::String(raw),
        };

        if let Some(ref choices) = self.choices {
            if !choices.contains(&value) {
                return Err(Error::new(ErrorKind::InvalidChoice {
                    name: String::from(name),
                    value,
                }));
            }
        }

        Ok(value)
    }
}

/// Wrap a type conversion failure unless it already is one
fn field_type_error(name: &str, value: String, source: BoxError) -> Error {
    match source.downcast::<Error>() {
        Ok(err) if matches!(err.kind(), ErrorKind::FieldType { .. }) => *err,
        Ok(err) => Error::new(ErrorKind::FieldType {
            name: String::from(name),
            value,
            source: err,
        }),
        Err(source) => Error::new(ErrorKind::FieldType {
            name: String::from(name),
            value,
            source,
        }),
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("value_type", &self.value_type.is_some())
            .field("multiple", &self.multiple)
            .field("unfold", &self.unfold)
            .field("choices", &self.choices)
            .field("action", &self.action.is_some())
            .finish()
    }
}

macro_rules! field_def_options {
    () => {
        /// Allow the field to occur more than once; all of its values are
        /// stored in a list in input order
        pub fn multiple(mut self) -> Self {
            self.def.multiple = true;
            self
        }

        /// Unfold the value (collapse line breaks and the whitespace around
        /// them to a single space) before applying the type
        pub fn unfold(mut self) -> Self {
            self.def.unfold = true;
            self
        }

        /// Convert the value before it is checked and stored. A failure is
        /// reported as [`ErrorKind::FieldType`].
        pub fn with_type<F>(mut self, convert: F) -> Self
        where
            F: Fn(&str) -> Result<Value, BoxError> + Send + Sync + 'static,
        {
            self.def.value_type = Some(Arc::new(convert));
            self
        }

        /// Restrict the values (after type conversion) the field may have
        pub fn choices<T, V>(mut self, choices: T) -> Self
        where
            T: IntoIterator<Item = V>,
            V: Into<Value>,
        {
            self.def.choices = Some(choices.into_iter().map(Into::into).collect());
            self
        }

        /// Invoke a callback instead of storing the value. The callback
        /// receives the record parsed so far, the field name, and the
        /// processed value, and must store the value itself if desired.
        pub fn action<F>(mut self, action: F) -> Self
        where
            F: Fn(&mut NormalizedDict, &str, Value) -> Result<(), BoxError>
                + Send
                + Sync
                + 'static,
        {
            self.def.action = Some(Arc::new(action));
            self
        }
    };
}

/// Definition of a header field recognized by a
/// [`HeaderParser`](crate::HeaderParser).
///
/// ```
/// use headerparser::{types, Field, HeaderParser, Value};
///
/// let mut parser = HeaderParser::new();
/// parser.add_field(Field::new("Version").alias("Vers").required()).unwrap();
/// parser.add_field(Field::new("Enabled").with_type(types::boolean).default(false)).unwrap();
///
/// let msg = parser.parse("vers: 1.2\n").unwrap();
/// assert_eq!(msg["Version"], "1.2");
/// assert_eq!(msg["Enabled"], Value::Bool(false));
/// ```
#[derive(Clone, Debug)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) dest: Option<String>,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) def: FieldDef,
}

impl Field {
    /// A field with the given primary name. The name is used in error
    /// messages and, unless overridden, as the key of the stored value.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Field {
            name: name.into(),
            aliases: Vec::new(),
            dest: None,
            required: false,
            default: None,
            def: FieldDef::default(),
        }
    }

    /// Another name under which the field may appear in the input
    pub fn alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<T, S>(mut self, aliases: T) -> Self
    where
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Store the value under this key instead of the field name
    pub fn dest<S: Into<String>>(mut self, dest: S) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Fail with [`ErrorKind::MissingField`] when the field is absent
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Store this value when the field is absent. The default is stored
    /// verbatim: it is not unfolded, converted, or checked against the
    /// choices.
    pub fn default<V: Into<Value>>(mut self, default: V) -> Self {
        self.default = Some(default.into());
        self
    }

    field_def_options!();

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key under which the value is stored
    pub fn dest_key(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.name)
    }

    /// Check the options that conflict with each other regardless of the
    /// other fields of the parser
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.def.action.is_some() && self.dest.is_some() {
            return Err(Error::new(ErrorKind::ActionWithDest {
                name: self.name.clone(),
            }));
        }

        if self.required && self.default.is_some() {
            return Err(Error::new(ErrorKind::RequiredWithDefault {
                name: self.name.clone(),
            }));
        }

        self.def.validate()
    }

    /// The primary name followed by the aliases
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// How fields not defined with [`HeaderParser::add_field`](crate::HeaderParser::add_field)
/// are processed once enabled with
/// [`HeaderParser::add_additional`](crate::HeaderParser::add_additional).
///
/// Additional fields are always stored under the name they have in the
/// input, and two of them are the same field iff their names are equal
/// after normalization.
#[derive(Clone, Debug, Default)]
pub struct Additional {
    pub(crate) def: FieldDef,
}

impl Additional {
    pub fn new() -> Self {
        Self::default()
    }

    field_def_options!();

    pub(crate) fn validate(&self) -> Result<(), Error> {
        self.def.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_conflicts() {
        let field = Field::new("Foo").dest("bar").action(|_, _, _| Ok(()));
        assert!(matches!(
            field.validate().unwrap_err().kind(),
            ErrorKind::ActionWithDest { .. }
        ));

        let field = Field::new("Foo").required().default("x");
        assert!(matches!(
            field.validate().unwrap_err().kind(),
            ErrorKind::RequiredWithDefault { .. }
        ));

        let field = Field::new("Foo").choices(Vec::<Value>::new());
        assert!(matches!(
            field.validate().unwrap_err().kind(),
            ErrorKind::EmptyChoices
        ));

        assert!(Field::new("Foo").required().multiple().validate().is_ok());
    }

    #[test]
    fn test_prepare_order() {
        let field = Field::new("Foo")
            .unfold()
            .with_type(crate::types::lower)
            .choices(["red green"]);
        let value = field.def.prepare("Foo", String::from("RED\n  GREEN")).unwrap();
        assert_eq!(value, Value::from("red green"));
    }

    #[test]
    fn test_prepare_wraps_type_errors() {
        let field = Field::new("Foo").with_type(crate::types::boolean);
        let err = field.def.prepare("Foo", String::from("maybe")).unwrap_err();
        match err.kind() {
            ErrorKind::FieldType { name, value, .. } => {
                assert_eq!(name, "Foo");
                assert_eq!(value, "maybe");
            }
            kind => panic!("unexpected error: {:?}", kind),
        }
    }

    #[test]
    fn test_prepare_keeps_field_type_errors() {
        let field = Field::new("Foo").with_type(|_| {
            Err(Box::new(Error::new(ErrorKind::FieldType {
                name: String::from("Inner"),
                value: String::from("v"),
                source: "nope".into(),
            })) as BoxError)
        });
        let err = field.def.prepare("Foo", String::from("x")).unwrap_err();
        assert_eq!(err.field_name(), Some("Inner"));
    }

    #[test]
    fn test_dest_key() {
        assert_eq!(Field::new("Foo").dest_key(), "Foo");
        assert_eq!(Field::new("Foo").dest("bar").dest_key(), "bar");
        assert_eq!(
            Field::new("Foo").aliases(["F", "Fu"]).names().collect::<Vec<_>>(),
            vec!["Foo", "F", "Fu"]
        );
    }
}
