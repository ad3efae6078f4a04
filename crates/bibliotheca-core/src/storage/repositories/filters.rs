use crate::models::{Entity, FieldName, FieldValue};

/// Exact-equality filters over the fields of one entity kind, combined with AND.
///
/// An empty filter set matches everything. A filter naming a field the
/// entity does not have, or a value that field can never hold, matches
/// nothing.
#[derive(Debug, Clone)]
pub struct Filters<F> {
    conditions: Vec<(F, FieldValue)>,
    unsatisfiable: bool,
}

impl<F> Default for Filters<F> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            unsatisfiable: false,
        }
    }
}

impl<F: FieldName> Filters<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: F, value: impl Into<FieldValue>) -> Self {
        self.conditions.push((field, value.into()));
        self
    }

    /// Build filters from field names and typed values.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut filters = Self::new();
        for (name, value) in pairs {
            match F::parse(name.as_ref()) {
                Some(field) => filters.conditions.push((field, value.into())),
                None => filters.unsatisfiable = true,
            }
        }
        filters
    }

    /// Build filters from `field` / raw text pairs, parsing each value by the
    /// field's kind (`year=1869` compares as an integer).
    pub fn parse_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::new();
        for (name, raw) in pairs {
            let parsed = F::parse(name.as_ref())
                .and_then(|field| FieldValue::parse(field.value_kind(), raw.as_ref()).map(|v| (field, v)));
            match parsed {
                Some(condition) => filters.conditions.push(condition),
                None => filters.unsatisfiable = true,
            }
        }
        filters
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && !self.unsatisfiable
    }

    pub fn matches<E: Entity<Field = F>>(&self, entity: &E) -> bool {
        !self.unsatisfiable
            && self
                .conditions
                .iter()
                .all(|(field, expected)| entity.field(*field) == *expected)
    }
}
