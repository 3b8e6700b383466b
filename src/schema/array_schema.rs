use std::fmt;

use crate::errors::ProtocolError;
use crate::net::records::{AttributeDescRecord, DimensionDescRecord, QueryResultRecord};
use crate::schema::types::TypeId;

const ATTR_FLAG_NULLABLE: u32 = 1;
const ATTR_FLAG_EMPTY_INDICATOR: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: u32,
    pub name: String,
    pub type_id: TypeId,
    pub nullable: bool,
    pub empty_indicator: bool,
}

impl Attribute {
    pub fn new(id: u32, name: impl Into<String>, type_id: TypeId, flags: u32) -> Self {
        Self {
            id,
            name: name.into(),
            type_id,
            nullable: flags & ATTR_FLAG_NULLABLE != 0,
            empty_indicator: flags & ATTR_FLAG_EMPTY_INDICATOR != 0,
        }
    }

    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.nullable {
            flags |= ATTR_FLAG_NULLABLE;
        }
        if self.empty_indicator {
            flags |= ATTR_FLAG_EMPTY_INDICATOR;
        }
        flags
    }
}

impl From<&AttributeDescRecord> for Attribute {
    fn from(rec: &AttributeDescRecord) -> Self {
        Attribute::new(rec.id, rec.name.clone(), TypeId::parse(&rec.type_id), rec.flags)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub start_min: i64,
    pub curr_start: i64,
    pub curr_end: i64,
    pub end_max: i64,
    pub chunk_interval: i64,
    pub chunk_overlap: i64,
}

impl Dimension {
    /// Number of cells a tile starting at `origin` spans along this axis.
    pub fn extent_from(&self, origin: i64) -> i64 {
        self.chunk_interval
            .min(self.end_max.saturating_sub(origin).saturating_add(1))
    }
}

impl From<&DimensionDescRecord> for Dimension {
    fn from(rec: &DimensionDescRecord) -> Self {
        Self {
            name: rec.name.clone(),
            start_min: rec.start_min,
            curr_start: rec.curr_start,
            curr_end: rec.curr_end,
            end_max: rec.end_max,
            chunk_interval: rec.chunk_interval,
            chunk_overlap: rec.chunk_overlap,
        }
    }
}

/// Shape of a result array: ordered attributes and dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub dimensions: Vec<Dimension>,
}

impl ArraySchema {
    /// Builds a schema, checking the properties the decoders rely on.
    pub fn new(
        name: impl Into<String>,
        attributes: Vec<Attribute>,
        dimensions: Vec<Dimension>,
    ) -> Result<Self, ProtocolError> {
        for (idx, attr) in attributes.iter().enumerate() {
            if attr.id as usize != idx {
                return Err(ProtocolError::InvalidSchema(format!(
                    "attribute '{}' has id {} at position {}",
                    attr.name, attr.id, idx
                )));
            }
        }
        if attributes.iter().filter(|a| a.empty_indicator).count() > 1 {
            return Err(ProtocolError::InvalidSchema(
                "more than one empty indicator attribute".to_string(),
            ));
        }
        if let Some(dim) = dimensions.iter().find(|d| d.chunk_interval <= 0) {
            return Err(ProtocolError::InvalidSchema(format!(
                "dimension '{}' has chunk interval {}",
                dim.name, dim.chunk_interval
            )));
        }
        Ok(Self {
            name: name.into(),
            attributes,
            dimensions,
        })
    }

    pub fn empty_indicator(&self) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.empty_indicator)
    }

    /// Attributes that carry cell values, in id order.
    pub fn value_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| !a.empty_indicator)
    }

    pub fn attribute(&self, id: u32) -> Option<&Attribute> {
        self.attributes.get(id as usize)
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }
}

impl TryFrom<&QueryResultRecord> for ArraySchema {
    type Error = ProtocolError;

    fn try_from(rec: &QueryResultRecord) -> Result<Self, Self::Error> {
        ArraySchema::new(
            rec.array_name.clone(),
            rec.attributes.iter().map(Attribute::from).collect(),
            rec.dimensions.iter().map(Dimension::from).collect(),
        )
    }
}

impl fmt::Display for ArraySchema {
    /// Renders as `name<a:int32 NULL,c:char>[x=0:3,2,0]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<", self.name)?;
        for (i, attr) in self.value_attributes().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", attr.name, attr.type_id)?;
            if attr.nullable {
                f.write_str(" NULL")?;
            }
        }
        f.write_str(">[")?;
        for (i, dim) in self.dimensions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(
                f,
                "{}={}:{},{},{}",
                dim.name, dim.start_min, dim.end_max, dim.chunk_interval, dim.chunk_overlap
            )?;
        }
        f.write_str("]")
    }
}
