use std::fmt;

use crate::client::array::ResultArray;
use crate::errors::ProtocolError;
use crate::net::records::{QueryResultRecord, WarningRecord};
use crate::schema::ArraySchema;

/// A non-fatal diagnostic attached to a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub code: i32,
    pub file: String,
    pub function: String,
    pub line: i32,
    pub message: String,
    pub strings_namespace: String,
    pub stringified_code: String,
}

impl From<&WarningRecord> for Warning {
    fn from(rec: &WarningRecord) -> Self {
        Self {
            code: rec.code,
            file: rec.file.clone(),
            function: rec.function.clone(),
            line: rec.line,
            message: rec.what_str.clone(),
            strings_namespace: rec.strings_namespace.clone(),
            stringified_code: rec.stringified_code.clone(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning {}", self.stringified_code)?;
        if !self.file.is_empty() {
            write!(f, " in {}:{} {}", self.file, self.line, self.function)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Outcome of preparing or executing a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub query_id: u64,
    pub selective: bool,
    pub schema: ArraySchema,
    pub explain_logical: String,
    pub explain_physical: String,
    pub execution_time_ms: u64,
    pub exclusive_array_access: bool,
    pub plugins: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl QueryResult {
    pub fn from_record(query_id: u64, rec: &QueryResultRecord) -> Result<Self, ProtocolError> {
        Ok(Self {
            query_id,
            selective: rec.selective,
            schema: ArraySchema::try_from(rec)?,
            explain_logical: rec.explain_logical.clone(),
            explain_physical: rec.explain_physical.clone(),
            execution_time_ms: rec.execution_time,
            exclusive_array_access: rec.exclusive_array_access,
            plugins: rec.plugins.clone(),
            warnings: rec.warnings.iter().map(Warning::from).collect(),
        })
    }

    /// The streamable result array; `None` for non-selective queries.
    pub fn result_array(&self) -> Option<ResultArray> {
        self.selective
            .then(|| ResultArray::new(self.query_id, self.schema.clone()))
    }
}
