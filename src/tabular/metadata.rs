use crate::errors::UsageError;
use crate::schema::{ArraySchema, TypeId};

/// Where a column's values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Coordinate along the k-th dimension.
    Dimension(usize),
    /// Value of the attribute with this id.
    Attribute(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub type_id: TypeId,
    pub source: ColumnSource,
}

/// Flattened view of an array schema: dimensions first, then every
/// attribute except the empty indicator. Column indices are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSetMetadata {
    table_name: String,
    columns: Vec<ColumnInfo>,
}

impl ResultSetMetadata {
    pub fn new(schema: &ArraySchema) -> Self {
        let dims = schema
            .dimensions
            .iter()
            .enumerate()
            .map(|(k, dim)| ColumnInfo {
                name: dim.name.clone(),
                type_id: TypeId::Int64,
                source: ColumnSource::Dimension(k),
            });
        let attrs = schema.value_attributes().map(|attr| ColumnInfo {
            name: attr.name.clone(),
            type_id: attr.type_id.clone(),
            source: ColumnSource::Attribute(attr.id),
        });
        Self {
            table_name: schema.name.clone(),
            columns: dims.chain(attrs).collect(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, column: usize) -> Result<&ColumnInfo, UsageError> {
        column
            .checked_sub(1)
            .and_then(|i| self.columns.get(i))
            .ok_or(UsageError::InvalidColumn(column))
    }

    pub fn column_name(&self, column: usize) -> Result<&str, UsageError> {
        Ok(&self.column(column)?.name)
    }

    pub fn column_type_name(&self, column: usize) -> Result<String, UsageError> {
        Ok(self.column(column)?.type_id.to_string())
    }

    pub fn is_column_attribute(&self, column: usize) -> Result<bool, UsageError> {
        Ok(matches!(
            self.column(column)?.source,
            ColumnSource::Attribute(_)
        ))
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// 1-based index of the first column with this name.
    pub fn find_column(&self, label: &str) -> Result<usize, UsageError> {
        self.columns
            .iter()
            .position(|c| c.name == label)
            .map(|i| i + 1)
            .ok_or_else(|| UsageError::UnknownColumn(label.to_string()))
    }
}

/// Anything that names a column: a 1-based index or a label.
pub trait ColumnIndex {
    fn resolve(&self, metadata: &ResultSetMetadata) -> Result<usize, UsageError>;
}

impl ColumnIndex for usize {
    fn resolve(&self, metadata: &ResultSetMetadata) -> Result<usize, UsageError> {
        metadata.column(*self)?;
        Ok(*self)
    }
}

impl ColumnIndex for &str {
    fn resolve(&self, metadata: &ResultSetMetadata) -> Result<usize, UsageError> {
        metadata.find_column(self)
    }
}

impl ColumnIndex for String {
    fn resolve(&self, metadata: &ResultSetMetadata) -> Result<usize, UsageError> {
        metadata.find_column(self)
    }
}
