use std::{collections::HashSet, sync::Arc};

use super::{Item, ItemClass};
use crate::error::{ExtError, Result};

/// One declared field of a record class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordField {
    name: String,
    class: ItemClass,
    nullable: bool,
}

impl RecordField {
    /// Declare a field.
    pub fn new(name: impl Into<String>, class: impl Into<ItemClass>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            nullable,
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared item class.
    pub fn class(&self) -> &ItemClass {
        &self.class
    }

    /// Whether the field may hold nulls.
    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

/// Schema descriptor of a record: a name plus ordered, uniquely named fields.
///
/// Record classes are compared structurally, so a class rebuilt from extension metadata
/// equals the class the data was written with as long as names, field classes and
/// nullability agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordClass {
    name: String,
    fields: Vec<RecordField>,
}

impl RecordClass {
    /// Build a record class.
    ///
    /// # Errors
    /// Returns [`ExtError::DuplicateMember`] when two fields share a name.
    pub fn new(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = RecordField>,
    ) -> Result<Self> {
        let name = name.into();
        let fields: Vec<RecordField> = fields.into_iter().collect();
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(ExtError::DuplicateMember {
                    class: name,
                    what: "field",
                    member: field.name.clone(),
                });
            }
        }
        Ok(Self { name, fields })
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered fields.
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(RecordField::name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a field.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Position of a field, failing with a lookup error when undeclared.
    pub fn require_index(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| ExtError::UnknownField {
            record: self.name.clone(),
            field: name.to_string(),
        })
    }
}

/// A record instance: its class plus one optional item per field.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    class: Arc<RecordClass>,
    values: Vec<Option<Item>>,
}

impl RecordValue {
    /// Positional constructor.
    ///
    /// # Errors
    /// Returns [`ExtError::Arity`] when the value count differs from the field count.
    pub fn new(class: Arc<RecordClass>, values: Vec<Option<Item>>) -> Result<Self> {
        if values.len() != class.len() {
            return Err(ExtError::Arity {
                record: class.name.clone(),
                expected: class.len(),
                actual: values.len(),
            });
        }
        Ok(Self { class, values })
    }

    /// Keyword constructor. Omitted nullable fields default to null.
    ///
    /// # Errors
    /// Unknown names fail with [`ExtError::UnknownField`]; an omitted non-nullable field fails
    /// with [`ExtError::UnexpectedNull`].
    pub fn from_fields<K, I>(class: Arc<RecordClass>, fields: I) -> Result<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Option<Item>)>,
    {
        let mut values: Vec<Option<Option<Item>>> = vec![None; class.len()];
        for (key, value) in fields {
            let idx = class.require_index(key.as_ref())?;
            values[idx] = Some(value);
        }
        let values = values
            .into_iter()
            .zip(class.fields())
            .map(|(value, field)| match value {
                Some(v) => Ok(v),
                None if field.nullable => Ok(None),
                None => Err(ExtError::unexpected_null(format!(
                    "field '{}' of record '{}'",
                    field.name, class.name
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { class, values })
    }

    /// Record class.
    pub fn class(&self) -> &Arc<RecordClass> {
        &self.class
    }

    /// Field values in declaration order.
    pub fn values(&self) -> &[Option<Item>] {
        &self.values
    }

    /// Consume into field values.
    pub fn into_values(self) -> Vec<Option<Item>> {
        self.values
    }

    /// Value of a named field.
    ///
    /// # Errors
    /// Returns [`ExtError::UnknownField`] for an undeclared name.
    pub fn get(&self, name: &str) -> Result<Option<&Item>> {
        let idx = self.class.require_index(name)?;
        Ok(self.values[idx].as_ref())
    }
}
