//! Logical field types. Pure data; the classification rule here is the
//! single authority shared by the extractor, the sizer, and the cost model,
//! so document sizes and query-field sizes can never disagree.

use serde::{Deserialize, Deserializer, Serialize};

use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    Number,
    Integer,
    #[serde(rename = "string")]
    Str,
    Date,
    #[serde(rename = "longstring")]
    LongString,
    Array,
    Object,
    Reference,
    Unknown,
}

impl<'de> Deserialize<'de> for LogicalType {
    /// Unrecognized type names (the parser's "boolean" markers included)
    /// deserialize to `Unknown` rather than erroring.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

impl LogicalType {
    /// Declared type name to logical type, unknown names falling through.
    pub fn from_name(name: &str) -> Self {
        match name {
            "number" => Self::Number,
            "integer" => Self::Integer,
            "string" => Self::Str,
            "date" => Self::Date,
            "longstring" => Self::LongString,
            "array" => Self::Array,
            "object" => Self::Object,
            "reference" => Self::Reference,
            _ => Self::Unknown,
        }
    }

    /// Normalize an attribute to a logical type.
    ///
    /// Name-based overrides take priority over the declared type: an
    /// attribute whose name contains "description" or "comment" is long
    /// text no matter what the schema says, and one containing "date" is a
    /// date. This mirrors how the byte-size table is keyed.
    pub fn classify(name: &str, declared: Option<&str>) -> Self {
        let lname = name.to_ascii_lowercase();
        if lname.contains("description") || lname.contains("comment") {
            return Self::LongString;
        }
        if lname.contains("date") {
            return Self::Date;
        }
        Self::from_name(declared.unwrap_or_default())
    }

    /// Average encoded size of one value of this type, in bytes.
    ///
    /// Arrays contribute only via their contents. Objects and references
    /// fall back to the number size; expanding them into their referenced
    /// entity is the caller's job (the sizer and the cost model both do).
    pub const fn byte_size(self) -> u64 {
        match self {
            Self::Number | Self::Integer | Self::Unknown => stats::SIZE_NUMBER,
            Self::Str => stats::SIZE_STRING,
            Self::Date => stats::SIZE_DATE,
            Self::LongString => stats::SIZE_LONGSTRING,
            Self::Array => stats::SIZE_ARRAY,
            Self::Object | Self::Reference => stats::SIZE_NUMBER,
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}
