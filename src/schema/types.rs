use std::fmt;

/// Attribute type tag as reported by the server.
/// - Fixed-length strings arrive as `string_<n>`
/// - Anything else unrecognized is kept verbatim in `Other`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeId {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
    Bool,
    Char,
    String,
    FixedString(usize),
    Datetime,
    DatetimeTz,
    Indicator,
    Void,
    Binary,
    Other(String),
}

impl TypeId {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "int8" => TypeId::Int8,
            "int16" => TypeId::Int16,
            "int32" => TypeId::Int32,
            "int64" => TypeId::Int64,
            "uint8" => TypeId::Uint8,
            "uint16" => TypeId::Uint16,
            "uint32" => TypeId::Uint32,
            "uint64" => TypeId::Uint64,
            "float" => TypeId::Float,
            "double" => TypeId::Double,
            "bool" => TypeId::Bool,
            "char" => TypeId::Char,
            "string" => TypeId::String,
            "datetime" => TypeId::Datetime,
            "datetimetz" => TypeId::DatetimeTz,
            "indicator" => TypeId::Indicator,
            "void" => TypeId::Void,
            "binary" => TypeId::Binary,
            other => match other.strip_prefix("string_").map(str::parse::<usize>) {
                Some(Ok(n)) => TypeId::FixedString(n),
                _ => TypeId::Other(other.to_string()),
            },
        }
    }

    /// Fixed storage width in bytes; `None` for variable-length types.
    pub fn byte_size(&self) -> Option<usize> {
        match self {
            TypeId::Int8 | TypeId::Uint8 | TypeId::Char | TypeId::Bool | TypeId::Indicator => {
                Some(1)
            }
            TypeId::Int16 | TypeId::Uint16 => Some(2),
            TypeId::Int32 | TypeId::Uint32 | TypeId::Float => Some(4),
            TypeId::Int64 | TypeId::Uint64 | TypeId::Double | TypeId::Datetime => Some(8),
            TypeId::DatetimeTz => Some(16),
            TypeId::FixedString(n) => Some(*n),
            TypeId::Void => Some(0),
            TypeId::String | TypeId::Binary | TypeId::Other(_) => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            TypeId::Int8
                | TypeId::Int16
                | TypeId::Int32
                | TypeId::Int64
                | TypeId::Uint8
                | TypeId::Uint16
                | TypeId::Uint32
                | TypeId::Uint64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, TypeId::Float | TypeId::Double)
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        let s = match self {
            TypeId::Int8 => "int8",
            TypeId::Int16 => "int16",
            TypeId::Int32 => "int32",
            TypeId::Int64 => "int64",
            TypeId::Uint8 => "uint8",
            TypeId::Uint16 => "uint16",
            TypeId::Uint32 => "uint32",
            TypeId::Uint64 => "uint64",
            TypeId::Float => "float",
            TypeId::Double => "double",
            TypeId::Bool => "bool",
            TypeId::Char => "char",
            TypeId::String => "string",
            TypeId::Datetime => "datetime",
            TypeId::DatetimeTz => "datetimetz",
            TypeId::Indicator => "indicator",
            TypeId::Void => "void",
            TypeId::Binary => "binary",
            TypeId::FixedString(n) => return format!("string_{}", n).into(),
            TypeId::Other(tag) => return tag.as_str().into(),
        };
        s.into()
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}
