use std::{collections::HashSet, sync::Arc};

use crate::error::{ExtError, Result};

/// Schema descriptor of an integer enumeration: ordered `(name, value)` members.
///
/// Member names are unique. Values may repeat (aliases), but the enum extension type
/// rejects such classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumClass {
    name: String,
    members: Vec<(String, i64)>,
}

impl EnumClass {
    /// Build an enumeration class.
    ///
    /// # Errors
    /// Returns [`ExtError::DuplicateMember`] when two members share a name.
    pub fn new<N: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = (N, i64)>,
    ) -> Result<Self> {
        let name = name.into();
        let members: Vec<(String, i64)> = members.into_iter().map(|(n, v)| (n.into(), v)).collect();
        let mut seen = HashSet::with_capacity(members.len());
        for (member, _) in &members {
            if !seen.insert(member.as_str()) {
                return Err(ExtError::DuplicateMember {
                    class: name,
                    what: "name",
                    member: member.clone(),
                });
            }
        }
        Ok(Self { name, members })
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered members.
    pub fn members(&self) -> &[(String, i64)] {
        &self.members
    }

    /// Value of a member.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Name of the first member carrying `value`.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.members.iter().find(|(_, v)| *v == value).map(|(n, _)| n.as_str())
    }

    /// Fail when two members share a value.
    pub fn check_distinct_values(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.members.len());
        for (_, value) in &self.members {
            if !seen.insert(*value) {
                return Err(ExtError::DuplicateMember {
                    class: self.name.clone(),
                    what: "value",
                    member: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// One member of an [`EnumClass`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    class: Arc<EnumClass>,
    index: usize,
}

impl EnumValue {
    /// Member by name.
    ///
    /// # Errors
    /// Returns [`ExtError::UnknownMember`] when no member has that name.
    pub fn from_name(class: &Arc<EnumClass>, name: &str) -> Result<Self> {
        let index = class
            .members
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| ExtError::UnknownMember {
                class: class.name.clone(),
                member: name.to_string(),
            })?;
        Ok(Self {
            class: Arc::clone(class),
            index,
        })
    }

    /// Member by value; aliases resolve to the first declared member.
    ///
    /// # Errors
    /// Returns [`ExtError::InvalidEnumValue`] when no member has that value.
    pub fn from_value(class: &Arc<EnumClass>, value: i64) -> Result<Self> {
        let index = class
            .members
            .iter()
            .position(|(_, v)| *v == value)
            .ok_or_else(|| ExtError::InvalidEnumValue {
                class: class.name.clone(),
                value,
            })?;
        Ok(Self {
            class: Arc::clone(class),
            index,
        })
    }

    /// Enumeration class.
    pub fn class(&self) -> &Arc<EnumClass> {
        &self.class
    }

    /// Member name.
    pub fn name(&self) -> &str {
        &self.class.members[self.index].0
    }

    /// Member value.
    pub fn value(&self) -> i64 {
        self.class.members[self.index].1
    }
}
