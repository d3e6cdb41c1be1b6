/*!

A parser for RFC 822-style header sections: `Name: Value` lines, indented
continuation lines, and an optional body after the first blank line. It
works for email headers, Debian control file stanzas, and similar
line-oriented key/value formats, in much the same way that an argument
parser turns command-line tokens into a namespace.

## Features

- ✔ Declarative: describe each field once (aliases, types, defaults, choices, multiplicity) and get a normalized record back
- ✔ Lazy: fields are scanned on demand, so long header sections are never buffered
- ✔ Strict: malformed lines, unknown fields, duplicates, and missing fields are errors, never silently skipped
- ✔ Flexible: custom separators, custom name normalization, catch-all handling of undeclared fields, stanza streams

## Quick Start

```rust
use headerparser::{types, BodyPolicy, Field, HeaderParser, Value};

let mut parser = HeaderParser::new().with_body(BodyPolicy::Optional);
parser.add_field(Field::new("Package").required()).unwrap();
parser.add_field(Field::new("Essential").with_type(types::boolean).default(false)).unwrap();
parser.add_field(Field::new("Description").unfold()).unwrap();
parser.add_field(Field::new("Tag").alias("Tags").multiple()).unwrap();

let data = "Package: headerparser
Tag: rust
Description: argparse
 for RFC 822 headers
tags: parsing

The body goes here.
";

let msg = parser.parse(data).unwrap();
assert_eq!(msg["package"], "headerparser");
assert_eq!(msg["Essential"], Value::Bool(false));
assert_eq!(msg["Description"], "argparse for RFC 822 headers");
assert_eq!(msg["Tag"], Value::from(vec!["rust", "parsing"]));
assert_eq!(msg.body(), Some("The body goes here.\n"));
```

## One Level Lower

When no field definitions are wanted, the scanner can be used directly.
It yields each field with its raw (possibly multi-line) value, followed
by the body if the header section was ended by a blank line.

```rust
use headerparser::{scan, scan_stanzas, ScanEvent};

let events: Vec<_> = scan("Foo: red\nBar: green\n  folded\n").collect::<Result<_, _>>().unwrap();
assert_eq!(
    events,
    vec![ScanEvent::field("Foo", "red"), ScanEvent::field("Bar", "green\n  folded")]
);

let stanzas: Vec<_> = scan_stanzas("A: 1\n\n\nB: 2\n").collect::<Result<_, _>>().unwrap();
assert_eq!(
    stanzas,
    vec![
        vec![(String::from("A"), String::from("1"))],
        vec![(String::from("B"), String::from("2"))],
    ]
);
```

## Caveats

This is not a full RFC 822/2822 implementation: there is no MIME
handling, address parsing, or encoded-word decoding.

*/

mod errors;
mod normdict;
mod parser;
mod scanner;
pub mod types;
mod value;

pub use self::errors::*;
pub use self::normdict::{Iter, NormalizedDict, Normalizer};
pub use self::parser::*;
pub use self::scanner::*;
pub use self::value::Value;
