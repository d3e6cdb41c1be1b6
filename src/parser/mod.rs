//! Mapping scanned header fields onto declared field definitions.
mod field;
mod processor;

pub use self::field::{ActionFn, Additional, Field, TypeFn};

use self::processor::{AdditionalProcessor, BodyProcessor, NamedProcessor, Processor};
use crate::scanner::{Lines, ScanEvent, ScanOptions, Scanner, Stanzas};
use crate::{Error, ErrorKind, FieldPair, NormalizedDict, Normalizer};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Whether a body may follow the header section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyPolicy {
    /// A body may or may not be present
    #[default]
    Optional,

    /// Input without a body fails with [`ErrorKind::MissingBody`]
    Required,

    /// Input with a body fails with [`ErrorKind::BodyNotAllowed`]
    Forbidden,
}

/// A parser for RFC 822-style header sections.
///
/// Define the fields the parser should recognize with
/// [`HeaderParser::add_field`], configure handling of unrecognized fields
/// with [`HeaderParser::add_additional`], and then parse input with
/// [`HeaderParser::parse`] or another `parse_*` method.
///
/// ```
/// use headerparser::{BodyPolicy, Field, HeaderParser, Value};
///
/// let mut parser = HeaderParser::new().with_body(BodyPolicy::Required);
/// parser.add_field(Field::new("Foo").required()).unwrap();
/// parser.add_field(Field::new("Bar").multiple()).unwrap();
///
/// let msg = parser.parse("Foo: red\nBar: g1\nBar: g2\n\nBODY\n").unwrap();
/// assert_eq!(msg["foo"], "red");
/// assert_eq!(msg["Bar"], Value::from(vec!["g1", "g2"]));
/// assert_eq!(msg.body(), Some("BODY\n"));
///
/// let err = parser.parse("Bar: g1\n").unwrap_err();
/// assert_eq!(err.to_string(), "Required header field \"Foo\" is not present");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderParser {
    normalizer: Normalizer,
    body: BodyPolicy,
    scan_options: ScanOptions,
    fields: Vec<Field>,
    lookup: HashMap<String, usize>,
    dests: HashSet<String>,
    additional: Option<Additional>,
    custom_dests: bool,
}

impl HeaderParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare field names with this normalizer instead of lowercasing.
    /// The normalizer is also used by the returned records.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_body(mut self, body: BodyPolicy) -> Self {
        self.body = body;
        self
    }

    /// Options used when scanning input passed to the `parse_*` methods
    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.scan_options = options;
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn body_policy(&self) -> BodyPolicy {
        self.body
    }

    pub fn scan_options(&self) -> &ScanOptions {
        &self.scan_options
    }

    /// Define a header field. A field in the input whose name equals (after
    /// normalization) the field's name or one of its aliases is processed
    /// according to the field's options.
    ///
    /// Fails without registering anything if the field's options conflict,
    /// if a name or the destination is already used by another field, or if
    /// the field has a custom destination while additional fields are
    /// enabled.
    pub fn add_field(&mut self, field: Field) -> Result<(), Error> {
        field.validate()?;

        let normed: HashSet<String> = field.names().map(|n| self.normalizer.normalize(n)).collect();
        if let Some(redef) = field
            .names()
            .find(|n| self.lookup.contains_key(&self.normalizer.normalize(n)))
        {
            return Err(Error::new(ErrorKind::DuplicateName {
                name: String::from(redef),
            }));
        }

        let dest = self.normalizer.normalize(field.dest_key());
        if self.dests.contains(&dest) {
            return Err(Error::new(ErrorKind::DuplicateDest {
                dest: String::from(field.dest_key()),
            }));
        }

        let custom_dest = !normed.contains(&dest);
        if custom_dest && self.additional.is_some() {
            return Err(Error::new(ErrorKind::AdditionalWithDest));
        }

        let idx = self.fields.len();
        self.lookup.extend(normed.into_iter().map(|n| (n, idx)));
        self.dests.insert(dest);
        self.custom_dests |= custom_dest;
        self.fields.push(field);
        Ok(())
    }

    /// Process fields that were not defined with [`HeaderParser::add_field`]
    /// instead of failing with [`ErrorKind::UnknownField`]. Calling this
    /// again replaces the previous settings.
    pub fn add_additional(&mut self, additional: Additional) -> Result<(), Error> {
        if self.custom_dests {
            return Err(Error::new(ErrorKind::AdditionalWithDest));
        }

        additional.validate()?;
        self.additional = Some(additional);
        Ok(())
    }

    /// Restore the default of rejecting fields that were not defined
    pub fn disable_additional(&mut self) {
        self.additional = None;
    }

    /// Parse a header section, possibly followed by a body, from a string
    pub fn parse(&self, text: &str) -> Result<NormalizedDict, Error> {
        let mut scanner = Scanner::from_text_with_options(text, self.scan_options.clone());
        self.parse_scanner(&mut scanner)
    }

    /// Parse a header section, possibly followed by a body, from a sequence
    /// of lines. Body lines are concatenated as-is.
    pub fn parse_lines<T>(&self, lines: T) -> Result<NormalizedDict, Error>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let mut scanner = Scanner::with_options(lines, self.scan_options.clone());
        self.parse_scanner(&mut scanner)
    }

    /// Parse the remaining input of a scanner
    pub fn parse_scanner<I>(&self, scanner: &mut Scanner<I>) -> Result<NormalizedDict, Error>
    where
        I: Iterator,
        I::Item: AsRef<str>,
    {
        let mut state = ParseState::new(self);
        for event in scanner.scan()? {
            state.feed(event?)?;
        }
        state.finish()
    }

    /// Process already scanned events, as produced by [`Scanner::scan`].
    /// More than one body event fails with [`ErrorKind::DuplicateBody`].
    pub fn parse_stream<T>(&self, events: T) -> Result<NormalizedDict, Error>
    where
        T: IntoIterator,
        T::Item: Into<ScanEvent>,
    {
        let mut state = ParseState::new(self);
        for event in events {
            state.feed(event.into())?;
        }
        state.finish()
    }

    /// Parse the fields of the scanner's next stanza, up to the first blank
    /// line, leaving the rest of the input for
    /// [`Scanner::get_unscanned`] or further scanning. The stanza has no
    /// body.
    ///
    /// ```
    /// use headerparser::{Field, HeaderParser, Scanner};
    ///
    /// let mut parser = HeaderParser::new();
    /// parser.add_field(Field::new("Format").required()).unwrap();
    ///
    /// let mut scanner = Scanner::from_text("Format: 1.0\n\nFiles: *\n");
    /// let header = parser.parse_next_stanza(&mut scanner).unwrap();
    /// assert_eq!(header["Format"], "1.0");
    /// assert_eq!(scanner.get_unscanned().unwrap(), "Files: *\n");
    /// ```
    pub fn parse_next_stanza<I>(&self, scanner: &mut Scanner<I>) -> Result<NormalizedDict, Error>
    where
        I: Iterator,
        I::Item: AsRef<str>,
    {
        let mut state = ParseState::new(self);
        for field in scanner.scan_next_stanza()? {
            state.feed(ScanEvent::from(field?))?;
        }
        state.finish()
    }

    /// Parse the first stanza of a string and return it along with the
    /// text after the blank line that ended it. The remainder is empty when
    /// no blank line follows the stanza.
    pub fn parse_next_stanza_text(&self, text: &str) -> Result<(NormalizedDict, String), Error> {
        let mut scanner = Scanner::from_text_with_options(text, self.scan_options.clone());
        let record = self.parse_next_stanza(&mut scanner)?;
        let rest = if scanner.is_exhausted() {
            String::new()
        } else {
            scanner.get_unscanned()?
        };
        Ok((record, rest))
    }

    /// Parse zero or more stanzas of header fields separated by blank
    /// lines. The input contains no bodies, so a parser requiring one fails
    /// with [`ErrorKind::MissingBody`]. Iteration ends after the first
    /// error.
    pub fn parse_stanzas<'a>(&'a self, text: &'a str) -> ParseStanzas<'a, Lines<'a>> {
        ParseStanzas {
            parser: self,
            stanzas: crate::scan_stanzas_with(text, self.scan_options.clone()),
            done: false,
        }
    }

    pub fn parse_stanzas_lines<T>(&self, lines: T) -> ParseStanzas<'_, T::IntoIter>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        ParseStanzas {
            parser: self,
            stanzas: crate::scan_stanzas_lines_with(lines, self.scan_options.clone()),
            done: false,
        }
    }

    /// Process already scanned stanzas, as produced by
    /// [`Scanner::scan_stanzas`]. Iteration ends after the first error.
    pub fn parse_stanzas_stream<'a, T, S>(
        &'a self,
        stanzas: T,
    ) -> impl Iterator<Item = Result<NormalizedDict, Error>> + 'a
    where
        T: IntoIterator<Item = S> + 'a,
        S: 'a,
        S: IntoIterator<Item = FieldPair>,
    {
        let mut failed = false;
        stanzas.into_iter().map_while(move |stanza| {
            if failed {
                return None;
            }
            let record = self.parse_stream(stanza);
            failed = record.is_err();
            Some(record)
        })
    }
}

/// Iterator over the records parsed from each stanza. Created by
/// [`HeaderParser::parse_stanzas`].
#[derive(Debug)]
pub struct ParseStanzas<'p, I> {
    parser: &'p HeaderParser,
    stanzas: Stanzas<I>,
    done: bool,
}

impl<I> Iterator for ParseStanzas<'_, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<NormalizedDict, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let record = self
            .stanzas
            .next()?
            .and_then(|fields| self.parser.parse_stream(fields));
        self.done = record.is_err();
        Some(record)
    }
}

/// Routing of scanned events to processors during a single parse
struct ParseState<'p> {
    parser: &'p HeaderParser,
    data: NormalizedDict,
    processors: Vec<Processor<'p>>,
    additional: Option<usize>,
    body: usize,
}

impl<'p> ParseState<'p> {
    fn new(parser: &'p HeaderParser) -> Self {
        let mut processors: Vec<Processor<'p>> = parser
            .fields
            .iter()
            .map(|field| Processor::Named(NamedProcessor::new(field)))
            .collect();

        let additional = parser.additional.as_ref().map(|additional| {
            processors.push(Processor::Additional(AdditionalProcessor::new(additional)));
            processors.len() - 1
        });

        processors.push(Processor::Body(BodyProcessor::new(parser.body)));
        let body = processors.len() - 1;

        ParseState {
            parser,
            data: NormalizedDict::with_normalizer(parser.normalizer.clone()),
            processors,
            additional,
            body,
        }
    }

    fn feed(&mut self, event: ScanEvent) -> Result<(), Error> {
        let (idx, name, value) = match event {
            ScanEvent::Body(body) => (self.body, String::new(), body),
            ScanEvent::Field { name, value } => {
                let normed = self.parser.normalizer.normalize(&name);
                let idx = match (self.parser.lookup.get(&normed), self.additional) {
                    (Some(&idx), _) => idx,
                    (None, Some(idx)) => idx,
                    (None, None) => return Err(Error::new(ErrorKind::UnknownField { name })),
                };
                (idx, name, value)
            }
        };

        self.processors[idx].process(&mut self.data, &name, value)
    }

    fn finish(mut self) -> Result<NormalizedDict, Error> {
        for processor in &self.processors {
            processor.finish(&mut self.data)?;
        }

        debug!("parsed header section with {} fields", self.data.len());
        Ok(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_field_is_atomic() {
        let mut parser = HeaderParser::new();
        parser.add_field(Field::new("Foo")).unwrap();
        let err = parser
            .add_field(Field::new("Bar").alias("FOO"))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DuplicateName { name } if name == "FOO"));
        assert!(!parser.lookup.contains_key("bar"));
        assert_eq!(parser.fields.len(), 1);
        parser.add_field(Field::new("Bar")).unwrap();
    }

    #[test]
    fn test_processor_layout() {
        let mut parser = HeaderParser::new();
        parser.add_field(Field::new("Foo")).unwrap();
        parser.add_additional(Additional::new()).unwrap();
        let state = ParseState::new(&parser);
        assert_eq!(state.processors.len(), 3);
        assert_eq!(state.additional, Some(1));
        assert_eq!(state.body, 2);
    }

    #[test]
    fn test_parse_stream_duplicate_body() {
        let parser = HeaderParser::new();
        let err = parser
            .parse_stream(vec![
                ScanEvent::Body(String::from("a")),
                ScanEvent::Body(String::from("b")),
            ])
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DuplicateBody));
    }
}
