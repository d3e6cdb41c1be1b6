//! Splitting RFC 822-style text into header fields.
//!
//! The [`Scanner`] is a lazy, pull-based state machine: each field is
//! produced only when the consumer asks for the next one, so header
//! sections of any length are processed without buffering them. The body,
//! once reached, is materialized as a single string.
//!
//! ```
//! use headerparser::{scan, ScanEvent};
//!
//! let events: Result<Vec<_>, _> = scan("Foo: red\nBar: green\n  folded\n\nBODY\n").collect();
//! assert_eq!(
//!     events.unwrap(),
//!     vec![
//!         ScanEvent::field("Foo", "red"),
//!         ScanEvent::field("Bar", "green\n  folded"),
//!         ScanEvent::Body(String::from("BODY\n")),
//!     ]
//! );
//! ```
mod classify;
mod lines;

pub use self::classify::{classify, LineClass};
pub use self::lines::Lines;

use crate::{Error, ErrorKind};
use log::trace;
use regex::Regex;
use std::borrow::BorrowMut;
use std::marker::PhantomData;
use std::sync::OnceLock;

/// Pattern of the default name/value separator: a colon with optional
/// horizontal whitespace on either side
pub const DEFAULT_SEPARATOR: &str = r"[ \t]*:[ \t]*";

fn default_separator() -> Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR
        .get_or_init(|| Regex::new(DEFAULT_SEPARATOR).expect("default separator is valid"))
        .clone()
}

/// A `(name, value)` pair of a header field
pub type FieldPair = (String, String);

/// An item produced when scanning a header section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A header field with its (possibly multi-line) value
    Field { name: String, value: String },

    /// Everything after the blank line that ends the header section
    Body(String),
}

impl ScanEvent {
    /// Convenience constructor for a field event
    pub fn field<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        ScanEvent::Field {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The field name, or `None` for the body
    pub fn name(&self) -> Option<&str> {
        match self {
            ScanEvent::Field { name, .. } => Some(name),
            ScanEvent::Body(_) => None,
        }
    }

    /// The field value or body text
    pub fn value(&self) -> &str {
        match self {
            ScanEvent::Field { value, .. } => value,
            ScanEvent::Body(body) => body,
        }
    }
}

impl From<FieldPair> for ScanEvent {
    fn from((name, value): FieldPair) -> Self {
        ScanEvent::Field { name, value }
    }
}

/// Options controlling how lines are split into fields
#[derive(Debug, Clone)]
pub struct ScanOptions {
    separator: Regex,
    skip_leading_newlines: bool,
}

impl ScanOptions {
    pub fn new() -> Self {
        ScanOptions {
            separator: default_separator(),
            skip_leading_newlines: false,
        }
    }

    /// Use a custom separator between field names and values.
    ///
    /// The separator is searched for in each line; everything before the
    /// first match becomes the field name and everything after it the first
    /// line of the value. Whitespace around the separator is only removed if
    /// the pattern matches it.
    pub fn separator(mut self, separator: Regex) -> Self {
        self.separator = separator;
        self
    }

    /// Same as [`ScanOptions::separator`] but compiles the pattern first
    pub fn separator_str(self, pattern: &str) -> Result<Self, Error> {
        Ok(self.separator(Regex::new(pattern)?))
    }

    /// When true, blank lines before the first header line are discarded
    /// instead of ending an empty header section
    pub fn skip_leading_newlines(mut self, skip: bool) -> Self {
        self.skip_leading_newlines = skip;
        self
    }

    pub fn separator_regex(&self) -> &Regex {
        &self.separator
    }

    pub fn skips_leading_newlines(&self) -> bool {
        self.skip_leading_newlines
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions::new()
    }
}

/// Progress through a single stanza
#[derive(Debug, Default)]
struct StanzaState {
    name: Option<String>,
    value: String,
    begun: bool,
    more_left: bool,
    finished: bool,
}

impl StanzaState {
    fn fail(&mut self, kind: ErrorKind) -> Option<Result<FieldPair, Error>> {
        self.finished = true;
        Some(Err(Error::new(kind)))
    }
}

/// A single-use scanner over the lines of a header section.
///
/// Each operation processes some portion of the input not yet scanned.
/// [`Scanner::scan`], [`Scanner::scan_stanzas`], and
/// [`Scanner::get_unscanned`] process all of the remaining input, while
/// [`Scanner::scan_next_stanza`] only processes up through the first blank
/// line. Once the input is consumed, every operation fails with
/// [`ErrorKind::ScannerExhausted`].
#[derive(Debug)]
pub struct Scanner<I> {
    lines: I,
    options: ScanOptions,
    exhausted: bool,
}

impl<'a> Scanner<Lines<'a>> {
    /// Scan a string, breaking it into lines on CR, LF, and CR LF
    pub fn from_text(text: &'a str) -> Self {
        Scanner::new(Lines::new(text))
    }

    pub fn from_text_with_options(text: &'a str, options: ScanOptions) -> Self {
        Scanner::with_options(Lines::new(text), options)
    }
}

impl<I> Scanner<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    /// Scan a sequence of lines. Lines may or may not carry terminators.
    pub fn new<T>(lines: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Scanner::with_options(lines, ScanOptions::default())
    }

    pub fn with_options<T>(lines: T, options: ScanOptions) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Scanner {
            lines: lines.into_iter(),
            options,
            exhausted: false,
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Returns true once all input has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn ensure_input(&self) -> Result<(), Error> {
        if self.exhausted {
            Err(Error::new(ErrorKind::ScannerExhausted))
        } else {
            Ok(())
        }
    }

    /// Scan the remaining input for header fields, followed by a
    /// [`ScanEvent::Body`] holding everything after the first blank line.
    ///
    /// If there is no blank line, no body event is produced. If the blank
    /// line is the last line, the body is empty. Body lines are concatenated
    /// as-is, so lines without terminators are not given one.
    pub fn scan(&mut self) -> Result<Scan<I, &mut Self>, Error> {
        self.ensure_input()?;
        Ok(Scan::new(self))
    }

    /// Scan the remaining input up to the first blank line (the first blank
    /// line after a non-blank line when skipping leading newlines), leaving
    /// the rest unconsumed.
    pub fn scan_next_stanza(&mut self) -> Result<NextStanza<'_, I>, Error> {
        self.ensure_input()?;
        Ok(NextStanza {
            scanner: self,
            state: StanzaState::default(),
        })
    }

    /// Scan the remaining input as zero or more stanzas separated by blank
    /// lines. Consecutive blank lines between stanzas count as one, and
    /// blank lines at the end of the input do not create a stanza.
    pub fn scan_stanzas(&mut self) -> Result<Stanzas<I, &mut Self>, Error> {
        self.ensure_input()?;
        Ok(Stanzas::new(self))
    }

    /// Return all of the input not yet processed. Afterwards the scanner is
    /// exhausted.
    pub fn get_unscanned(&mut self) -> Result<String, Error> {
        self.ensure_input()?;
        self.exhausted = true;
        let mut rest = String::new();
        for line in self.lines.by_ref() {
            rest.push_str(line.as_ref());
        }
        Ok(rest)
    }

    /// Advance the stanza state machine until a field is complete
    fn step(&mut self, st: &mut StanzaState) -> Option<Result<FieldPair, Error>> {
        if st.finished {
            return None;
        }

        while let Some(raw) = self.lines.next() {
            match classify(raw.as_ref(), &self.options.separator) {
                LineClass::Continuation(line) => {
                    st.begun = true;
                    if st.name.is_none() {
                        return st.fail(ErrorKind::UnexpectedFolding {
                            line: String::from(line),
                        });
                    }
                    st.value.push('\n');
                    st.value.push_str(line);
                }
                LineClass::Field { name, value } => {
                    st.begun = true;
                    let done = st.name.replace(String::from(name));
                    let done_value = std::mem::replace(&mut st.value, String::from(value));
                    if let Some(done) = done {
                        trace!("scanned header field {:?}", done);
                        return Some(Ok((done, done_value)));
                    }
                }
                LineClass::Blank => {
                    if self.options.skip_leading_newlines && !st.begun {
                        continue;
                    }
                    trace!("blank line ends header section");
                    st.more_left = true;
                    break;
                }
                LineClass::Malformed(line) => {
                    return st.fail(ErrorKind::MalformedHeader {
                        line: String::from(line),
                    });
                }
            }
        }

        st.finished = true;
        if !st.more_left {
            self.exhausted = true;
        }

        let name = st.name.take()?;
        trace!("scanned header field {:?}", name);
        Some(Ok((name, std::mem::take(&mut st.value))))
    }
}

/// Iterator over the fields of a header section followed by its body.
/// Created by [`Scanner::scan`] and [`scan`].
#[derive(Debug)]
pub struct Scan<I, B = Scanner<I>> {
    scanner: B,
    state: StanzaState,
    done: bool,
    _lines: PhantomData<fn() -> I>,
}

impl<I, B> Scan<I, B> {
    fn new(scanner: B) -> Self {
        Scan {
            scanner,
            state: StanzaState::default(),
            done: false,
            _lines: PhantomData,
        }
    }
}

impl<I, B> Iterator for Scan<I, B>
where
    I: Iterator,
    I::Item: AsRef<str>,
    B: BorrowMut<Scanner<I>>,
{
    type Item = Result<ScanEvent, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let scanner: &mut Scanner<I> = self.scanner.borrow_mut();
        match scanner.step(&mut self.state) {
            Some(Ok(field)) => return Some(Ok(ScanEvent::from(field))),
            Some(Err(e)) => {
                self.done = true;
                return Some(Err(e));
            }
            None => {}
        }

        self.done = true;
        if scanner.is_exhausted() {
            None
        } else {
            Some(scanner.get_unscanned().map(ScanEvent::Body))
        }
    }
}

/// Iterator over the fields of the next stanza. Created by
/// [`Scanner::scan_next_stanza`].
#[derive(Debug)]
pub struct NextStanza<'s, I> {
    scanner: &'s mut Scanner<I>,
    state: StanzaState,
}

impl<I> Iterator for NextStanza<'_, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<FieldPair, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scanner.step(&mut self.state)
    }
}

/// Iterator over the stanzas of the input, each a list of fields. Created
/// by [`Scanner::scan_stanzas`] and [`scan_stanzas`].
#[derive(Debug)]
pub struct Stanzas<I, B = Scanner<I>> {
    scanner: B,
    done: bool,
    _lines: PhantomData<fn() -> I>,
}

impl<I, B> Stanzas<I, B> {
    fn new(scanner: B) -> Self {
        Stanzas {
            scanner,
            done: false,
            _lines: PhantomData,
        }
    }
}

impl<I, B> Iterator for Stanzas<I, B>
where
    I: Iterator,
    I::Item: AsRef<str>,
    B: BorrowMut<Scanner<I>>,
{
    type Item = Result<Vec<FieldPair>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let scanner: &mut Scanner<I> = self.scanner.borrow_mut();
        if scanner.is_exhausted() {
            self.done = true;
            return None;
        }

        let mut state = StanzaState::default();
        let mut fields = Vec::new();
        while let Some(field) = scanner.step(&mut state) {
            match field {
                Ok(field) => fields.push(field),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        if fields.is_empty() && scanner.is_exhausted() {
            self.done = true;
            return None;
        }

        scanner.options.skip_leading_newlines = true;
        trace!("scanned stanza of {} fields", fields.len());
        Some(Ok(fields))
    }
}

/// Scan a string for header fields and the body that follows them.
///
/// The string is broken into lines on CR, LF, and CR LF boundaries. See
/// [`Scanner::scan`] for the exact behavior.
pub fn scan(text: &str) -> Scan<Lines<'_>> {
    scan_with(text, ScanOptions::default())
}

pub fn scan_with(text: &str, options: ScanOptions) -> Scan<Lines<'_>> {
    Scan::new(Scanner::from_text_with_options(text, options))
}

/// Scan a sequence of lines for header fields and the body that follows them
pub fn scan_lines<T>(lines: T) -> Scan<T::IntoIter>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    scan_lines_with(lines, ScanOptions::default())
}

pub fn scan_lines_with<T>(lines: T, options: ScanOptions) -> Scan<T::IntoIter>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    Scan::new(Scanner::with_options(lines, options))
}

/// Scan a string for zero or more stanzas of header fields separated by
/// blank lines. See [`Scanner::scan_stanzas`].
pub fn scan_stanzas(text: &str) -> Stanzas<Lines<'_>> {
    scan_stanzas_with(text, ScanOptions::default())
}

pub fn scan_stanzas_with(text: &str, options: ScanOptions) -> Stanzas<Lines<'_>> {
    Stanzas::new(Scanner::from_text_with_options(text, options))
}

pub fn scan_stanzas_lines<T>(lines: T) -> Stanzas<T::IntoIter>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    scan_stanzas_lines_with(lines, ScanOptions::default())
}

pub fn scan_stanzas_lines_with<T>(lines: T, options: ScanOptions) -> Stanzas<T::IntoIter>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    Stanzas::new(Scanner::with_options(lines, options))
}
