use crate::net::records::{AttributeDescRecord, DimensionDescRecord, QueryResultRecord};
use crate::schema::{ArraySchema, Attribute, Dimension, TypeId};

const NULLABLE: u32 = 1;
const EMPTY_INDICATOR: u32 = 2;

/// Builds array schemas. Falls back to `a:int32` over `x=0:3,4` when no
/// attribute or dimension is given.
pub struct SchemaFactory {
    name: String,
    attributes: Vec<(String, String, u32)>,
    dimensions: Vec<Dimension>,
}

impl SchemaFactory {
    pub fn new() -> Self {
        Self {
            name: "result".into(),
            attributes: Vec::new(),
            dimensions: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_attribute(mut self, name: &str, type_id: &str) -> Self {
        self.attributes.push((name.into(), type_id.into(), 0));
        self
    }

    pub fn with_nullable_attribute(mut self, name: &str, type_id: &str) -> Self {
        self.attributes.push((name.into(), type_id.into(), NULLABLE));
        self
    }

    pub fn with_empty_indicator(mut self) -> Self {
        self.attributes
            .push(("EmptyTag".into(), "indicator".into(), EMPTY_INDICATOR));
        self
    }

    pub fn with_dimension(mut self, name: &str, start: i64, end: i64, interval: i64) -> Self {
        self.dimensions.push(Dimension {
            name: name.into(),
            start_min: start,
            curr_start: start,
            curr_end: end,
            end_max: end,
            chunk_interval: interval,
            chunk_overlap: 0,
        });
        self
    }

    fn attributes(&self) -> Vec<(String, String, u32)> {
        if self.attributes.is_empty() {
            vec![("a".into(), "int32".into(), 0)]
        } else {
            self.attributes.clone()
        }
    }

    fn dimensions(&self) -> Vec<Dimension> {
        if self.dimensions.is_empty() {
            vec![Dimension {
                name: "x".into(),
                start_min: 0,
                curr_start: 0,
                curr_end: 3,
                end_max: 3,
                chunk_interval: 4,
                chunk_overlap: 0,
            }]
        } else {
            self.dimensions.clone()
        }
    }

    pub fn create(self) -> ArraySchema {
        let attributes = self
            .attributes()
            .into_iter()
            .enumerate()
            .map(|(id, (name, type_id, flags))| {
                Attribute::new(id as u32, name, TypeId::parse(&type_id), flags)
            })
            .collect();
        ArraySchema::new(self.name.clone(), attributes, self.dimensions())
            .expect("factory schema is valid")
    }

    /// The schema as a selective query result record.
    pub fn create_record(self) -> QueryResultRecord {
        QueryResultRecord {
            selective: true,
            array_name: self.name.clone(),
            attributes: self
                .attributes()
                .into_iter()
                .enumerate()
                .map(|(id, (name, type_id, flags))| AttributeDescRecord {
                    id: id as u32,
                    name,
                    type_id,
                    flags,
                    ..Default::default()
                })
                .collect(),
            dimensions: self
                .dimensions()
                .into_iter()
                .map(|d| DimensionDescRecord {
                    name: d.name,
                    start_min: d.start_min,
                    curr_start: d.curr_start,
                    curr_end: d.curr_end,
                    end_max: d.end_max,
                    chunk_interval: d.chunk_interval,
                    chunk_overlap: d.chunk_overlap,
                })
                .collect(),
            ..Default::default()
        }
    }
}
