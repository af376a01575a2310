use crate::{
    bugzilla::xmlrpc::Value,
    error::{BumpverError, Result},
};

/// Named approval flag on a bug, with state `+`, `-` or `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugFlag {
    pub name: String,
    pub status: String,
}

/// The fields of a tracker bug that release validation looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugRecord {
    pub product: String,
    pub status: String,
    pub fixed_in: String,
    pub flags: Vec<BugFlag>,
}

fn string_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl BugRecord {
    /// Build a record from one element of a `Bug.get` `bugs` array.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !matches!(value, Value::Struct(_)) {
            return Err(BumpverError::xmlrpc("bug entry is not a struct"));
        }

        let flags = value
            .get("flags")
            .and_then(Value::as_array)
            .unwrap_or_default()
            .iter()
            .map(|flag| BugFlag {
                name: string_field(flag, "name"),
                status: string_field(flag, "status"),
            })
            .collect();

        Ok(Self {
            product: string_field(value, "product"),
            status: string_field(value, "status"),
            fixed_in: string_field(value, "cf_fixed_in"),
            flags,
        })
    }
}
