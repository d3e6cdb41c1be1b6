use super::field::{Additional, Field, FieldDef};
use super::BodyPolicy;
use crate::{Error, ErrorKind, NormalizedDict, Value};
use log::debug;

/// Per-parse state for one destination of scanned input
#[derive(Debug)]
pub(crate) enum Processor<'p> {
    Named(NamedProcessor<'p>),
    Additional(AdditionalProcessor<'p>),
    Body(BodyProcessor),
}

impl<'p> Processor<'p> {
    /// Process one scanned value. `name` is the field name as observed in
    /// the input; it is unused for the body.
    pub(crate) fn process(
        &mut self,
        data: &mut NormalizedDict,
        name: &str,
        value: String,
    ) -> Result<(), Error> {
        match self {
            Processor::Named(p) => p.process(data, value),
            Processor::Additional(p) => p.process(data, name, value),
            Processor::Body(p) => p.process(data, value),
        }
    }

    /// Apply end of input checks and defaults
    pub(crate) fn finish(&self, data: &mut NormalizedDict) -> Result<(), Error> {
        match self {
            Processor::Named(p) => p.finish(data),
            Processor::Additional(_) => Ok(()),
            Processor::Body(p) => p.finish(),
        }
    }
}

/// Store a processed value according to the field's multiplicity. A
/// single value, or a list entry for a key holding a non-list value, may
/// not replace anything already stored under `dest`.
fn store(
    def: &FieldDef,
    data: &mut NormalizedDict,
    name: &str,
    dest: &str,
    value: Value,
) -> Result<(), Error> {
    if let Some(ref action) = def.action {
        return action(data, name, value).map_err(|e| Error::new(ErrorKind::Action(e)));
    }

    match data.get_mut(dest) {
        Some(Value::List(values)) if def.multiple => {
            values.push(value);
            Ok(())
        }
        Some(_) => Err(Error::new(ErrorKind::DuplicateField {
            name: String::from(name),
        })),
        None => {
            let value = if def.multiple {
                Value::List(vec![value])
            } else {
                value
            };
            data.insert(dest, value);
            Ok(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct NamedProcessor<'p> {
    field: &'p Field,
    seen: bool,
}

impl<'p> NamedProcessor<'p> {
    pub(crate) fn new(field: &'p Field) -> Self {
        NamedProcessor { field, seen: false }
    }

    fn process(&mut self, data: &mut NormalizedDict, raw: String) -> Result<(), Error> {
        let field = self.field;
        let value = field.def.prepare(&field.name, raw)?;
        store(&field.def, data, &field.name, field.dest_key(), value)?;
        self.seen = true;
        Ok(())
    }

    fn finish(&self, data: &mut NormalizedDict) -> Result<(), Error> {
        if self.seen {
            return Ok(());
        }

        if self.field.required {
            return Err(Error::new(ErrorKind::MissingField {
                name: self.field.name.clone(),
            }));
        }

        if let Some(ref default) = self.field.default {
            data.insert(self.field.dest_key(), default.clone());
        }

        Ok(())
    }
}

/// Stores undeclared fields under their observed names, so duplicates are
/// found by observed name through the record's normalizer
#[derive(Debug)]
pub(crate) struct AdditionalProcessor<'p> {
    additional: &'p Additional,
}

impl<'p> AdditionalProcessor<'p> {
    pub(crate) fn new(additional: &'p Additional) -> Self {
        AdditionalProcessor { additional }
    }

    fn process(&mut self, data: &mut NormalizedDict, name: &str, raw: String) -> Result<(), Error> {
        debug!("processing undeclared header field {:?}", name);
        let def = &self.additional.def;
        let value = def.prepare(name, raw)?;
        store(def, data, name, name, value)
    }
}

#[derive(Debug)]
pub(crate) struct BodyProcessor {
    policy: BodyPolicy,
    seen: bool,
}

impl BodyProcessor {
    pub(crate) fn new(policy: BodyPolicy) -> Self {
        BodyProcessor {
            policy,
            seen: false,
        }
    }

    fn process(&mut self, data: &mut NormalizedDict, body: String) -> Result<(), Error> {
        if self.seen {
            return Err(Error::new(ErrorKind::DuplicateBody));
        }

        if self.policy == BodyPolicy::Forbidden {
            return Err(Error::new(ErrorKind::BodyNotAllowed));
        }

        data.set_body(body);
        self.seen = true;
        Ok(())
    }

    fn finish(&self) -> Result<(), Error> {
        if self.policy == BodyPolicy::Required && !self.seen {
            Err(Error::new(ErrorKind::MissingBody))
        } else {
            Ok(())
        }
    }
}
