use std::cell::Cell;
use std::convert::identity;
use std::net::TcpStream;

use chrono::{DateTime, Utc};

use crate::chunk::ValueChunk;
use crate::client::{ArrayCursor, ResultArray};
use crate::errors::{ClientError, DecodeError, UsageError};
use crate::net::Transport;
use crate::schema::{ArraySchema, TypeId};
use crate::tabular::connection::SharedConnection;
use crate::tabular::metadata::{ColumnIndex, ColumnSource, ResultSetMetadata};
use crate::tabular::value::SqlValue;

type Reader<V> = fn(&ValueChunk) -> Result<V, DecodeError>;

/// Row-at-a-time view of a result array.
///
/// Each row is one present cell: its dimension coordinates followed by its
/// attribute values. The set starts positioned on the first row.
pub struct ResultSet<T: Transport = TcpStream> {
    cursor: ArrayCursor<SharedConnection<T>>,
    metadata: ResultSetMetadata,
    was_null: Cell<bool>,
    closed: bool,
}

impl<T: Transport> ResultSet<T> {
    pub fn open(connection: SharedConnection<T>, array: ResultArray) -> Result<Self, ClientError> {
        let options = connection.borrow_mut()?.decoder_options();
        let metadata = ResultSetMetadata::new(&array.schema);
        let cursor = ArrayCursor::open(connection, array, options)?;
        Ok(Self {
            cursor,
            metadata,
            was_null: Cell::new(false),
            closed: false,
        })
    }

    pub fn metadata(&self) -> &ResultSetMetadata {
        &self.metadata
    }

    pub fn schema(&self) -> &ArraySchema {
        self.cursor.schema()
    }

    pub fn find_column(&self, label: &str) -> Result<usize, ClientError> {
        Ok(self.metadata.find_column(label)?)
    }

    /// Moves to the next row; false once past the last one.
    pub fn next(&mut self) -> Result<bool, ClientError> {
        self.ensure_open()?;
        self.cursor.move_next()
    }

    pub fn is_after_last(&self) -> bool {
        self.closed || self.cursor.is_exhausted()
    }

    pub fn is_first(&self) -> bool {
        !self.is_after_last() && self.cursor.cell_number() == 1
    }

    pub fn is_last(&self) -> bool {
        !self.is_after_last() && !self.cursor.has_next()
    }

    /// 1-based row number; 0 when past the end.
    pub fn get_row(&self) -> u64 {
        if self.is_after_last() {
            0
        } else {
            self.cursor.cell_number()
        }
    }

    /// Whether the last getter hit a null cell.
    pub fn was_null(&self) -> bool {
        self.was_null.get()
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), ClientError> {
        if self.closed {
            return Err(UsageError::ResultSetClosed.into());
        }
        Ok(())
    }

    fn source(&self, column: impl ColumnIndex) -> Result<(ColumnSource, TypeId), ClientError> {
        self.ensure_open()?;
        self.was_null.set(false);
        let index = column.resolve(&self.metadata)?;
        let info = self.metadata.column(index)?;
        Ok((info.source, info.type_id.clone()))
    }

    fn coordinate(&self, k: usize) -> Result<i64, ClientError> {
        let coords = self.cursor.coordinates()?;
        coords
            .get(k)
            .copied()
            .ok_or(ClientError::Usage(UsageError::InvalidColumn(k + 1)))
    }

    /// Reads an attribute through `reader`; `None` when the cell is null.
    fn read_attribute<V>(&self, id: u32, reader: Reader<V>) -> Result<Option<V>, ClientError> {
        let chunk = self.cursor.attribute(id)?;
        if chunk.is_null()? {
            self.was_null.set(true);
            return Ok(None);
        }
        Ok(Some(reader(chunk)?))
    }

    fn typed<V>(
        &self,
        column: impl ColumnIndex,
        requested: &'static str,
        dimension: Option<fn(i64) -> V>,
        pick: impl FnOnce(&TypeId) -> Option<Reader<V>>,
    ) -> Result<Option<V>, ClientError> {
        let (source, type_id) = self.source(column)?;
        match source {
            ColumnSource::Dimension(k) => match dimension {
                Some(convert) => Ok(Some(convert(self.coordinate(k)?))),
                None => Err(type_error(&type_id, requested)),
            },
            ColumnSource::Attribute(id) => match pick(&type_id) {
                Some(reader) => self.read_attribute(id, reader),
                None => Err(type_error(&type_id, requested)),
            },
        }
    }

    pub fn get_string(&self, column: impl ColumnIndex) -> Result<Option<String>, ClientError> {
        self.typed(column, "String", None, |t| {
            let reader: Reader<String> = match t {
                TypeId::String | TypeId::FixedString(_) => |c| c.get_string(),
                TypeId::Char => |c| c.get_char().map(String::from),
                _ => return None,
            };
            Some(reader)
        })
    }

    pub fn get_boolean(&self, column: impl ColumnIndex) -> Result<Option<bool>, ClientError> {
        self.typed(column, "boolean", None, |t| {
            let reader: Reader<bool> = match t {
                TypeId::Bool => |c| c.get_bool(),
                _ => return None,
            };
            Some(reader)
        })
    }

    pub fn get_byte(&self, column: impl ColumnIndex) -> Result<Option<i8>, ClientError> {
        self.typed(column, "byte", None, |t| {
            let reader: Reader<i8> = match t {
                TypeId::Int8 => |c| c.get_i8(),
                _ => return None,
            };
            Some(reader)
        })
    }

    pub fn get_short(&self, column: impl ColumnIndex) -> Result<Option<i16>, ClientError> {
        self.typed(column, "short", None, |t| {
            let reader: Reader<i16> = match t {
                TypeId::Int16 => |c| c.get_i16(),
                TypeId::Int8 => |c| c.get_i8().map(i16::from),
                TypeId::Uint8 => |c| c.get_u8().map(i16::from),
                _ => return None,
            };
            Some(reader)
        })
    }

    pub fn get_int(&self, column: impl ColumnIndex) -> Result<Option<i32>, ClientError> {
        self.typed(column, "int", None, |t| {
            let reader: Reader<i32> = match t {
                TypeId::Int32 => |c| c.get_i32(),
                TypeId::Int16 => |c| c.get_i16().map(i32::from),
                TypeId::Int8 => |c| c.get_i8().map(i32::from),
                TypeId::Uint16 => |c| c.get_u16().map(i32::from),
                TypeId::Uint8 => |c| c.get_u8().map(i32::from),
                _ => return None,
            };
            Some(reader)
        })
    }

    /// Dimension columns yield the coordinate of the current row.
    pub fn get_long(&self, column: impl ColumnIndex) -> Result<Option<i64>, ClientError> {
        self.typed(column, "long", Some(identity as fn(i64) -> i64), |t| {
            let reader: Reader<i64> = match t {
                TypeId::Int64 => |c| c.get_i64(),
                TypeId::Int32 => |c| c.get_i32().map(i64::from),
                TypeId::Int16 => |c| c.get_i16().map(i64::from),
                TypeId::Int8 => |c| c.get_i8().map(i64::from),
                TypeId::Uint32 => |c| c.get_u32().map(i64::from),
                TypeId::Uint16 => |c| c.get_u16().map(i64::from),
                TypeId::Uint8 => |c| c.get_u8().map(i64::from),
                _ => return None,
            };
            Some(reader)
        })
    }

    pub fn get_float(&self, column: impl ColumnIndex) -> Result<Option<f32>, ClientError> {
        self.typed(column, "float", None, |t| {
            let reader: Reader<f32> = match t {
                TypeId::Float => |c| c.get_f32(),
                TypeId::Double => |c| c.get_f64().map(|v| v as f32),
                TypeId::Int64 => |c| c.get_i64().map(|v| v as f32),
                TypeId::Int32 => |c| c.get_i32().map(|v| v as f32),
                TypeId::Int16 => |c| c.get_i16().map(f32::from),
                TypeId::Int8 => |c| c.get_i8().map(f32::from),
                TypeId::Uint64 => |c| c.get_u64().map(|v| v as f32),
                TypeId::Uint32 => |c| c.get_u32().map(|v| v as f32),
                TypeId::Uint16 => |c| c.get_u16().map(f32::from),
                TypeId::Uint8 => |c| c.get_u8().map(f32::from),
                _ => return None,
            };
            Some(reader)
        })
    }

    pub fn get_double(&self, column: impl ColumnIndex) -> Result<Option<f64>, ClientError> {
        self.typed(column, "double", None, |t| {
            let reader: Reader<f64> = match t {
                TypeId::Double => |c| c.get_f64(),
                TypeId::Float => |c| c.get_f32().map(f64::from),
                TypeId::Int64 => |c| c.get_i64().map(|v| v as f64),
                TypeId::Int32 => |c| c.get_i32().map(f64::from),
                TypeId::Int16 => |c| c.get_i16().map(f64::from),
                TypeId::Int8 => |c| c.get_i8().map(f64::from),
                TypeId::Uint64 => |c| c.get_u64().map(|v| v as f64),
                TypeId::Uint32 => |c| c.get_u32().map(f64::from),
                TypeId::Uint16 => |c| c.get_u16().map(f64::from),
                TypeId::Uint8 => |c| c.get_u8().map(f64::from),
                _ => return None,
            };
            Some(reader)
        })
    }

    /// Exact integer of any width, unsigned 64-bit included.
    pub fn get_big_decimal(&self, column: impl ColumnIndex) -> Result<Option<i128>, ClientError> {
        self.typed(column, "BigDecimal", Some(i128::from as fn(i64) -> i128), |t| {
            let reader: Reader<i128> = match t {
                TypeId::Int64 => |c| c.get_i64().map(i128::from),
                TypeId::Int32 => |c| c.get_i32().map(i128::from),
                TypeId::Int16 => |c| c.get_i16().map(i128::from),
                TypeId::Int8 => |c| c.get_i8().map(i128::from),
                TypeId::Uint64 => |c| c.get_u64().map(i128::from),
                TypeId::Uint32 => |c| c.get_u32().map(i128::from),
                TypeId::Uint16 => |c| c.get_u16().map(i128::from),
                TypeId::Uint8 => |c| c.get_u8().map(i128::from),
                _ => return None,
            };
            Some(reader)
        })
    }

    /// `datetime` as is; `datetimetz` converted to UTC.
    pub fn get_timestamp(
        &self,
        column: impl ColumnIndex,
    ) -> Result<Option<DateTime<Utc>>, ClientError> {
        self.typed(column, "Timestamp", None, |t| {
            let reader: Reader<DateTime<Utc>> = match t {
                TypeId::Datetime => |c| c.get_datetime(),
                TypeId::DatetimeTz => |c| c.get_datetimetz().map(|v| v.with_timezone(&Utc)),
                _ => return None,
            };
            Some(reader)
        })
    }

    pub fn get_bytes(&self, column: impl ColumnIndex) -> Result<Option<Vec<u8>>, ClientError> {
        self.typed(column, "bytes", None, |t| {
            let reader: Reader<Vec<u8>> = match t {
                TypeId::Binary => |c| c.get_binary(),
                _ => return None,
            };
            Some(reader)
        })
    }

    /// The current value in its natural type.
    pub fn get_object(&self, column: impl ColumnIndex) -> Result<Option<SqlValue>, ClientError> {
        self.typed(column, "Object", Some(SqlValue::Int64 as fn(i64) -> SqlValue), |t| {
            let reader: Reader<SqlValue> = match t {
                TypeId::Bool => |c| c.get_bool().map(SqlValue::Bool),
                TypeId::Char => |c| c.get_char().map(SqlValue::Char),
                TypeId::Int8 => |c| c.get_i8().map(SqlValue::Int8),
                TypeId::Int16 => |c| c.get_i16().map(SqlValue::Int16),
                TypeId::Int32 => |c| c.get_i32().map(SqlValue::Int32),
                TypeId::Int64 => |c| c.get_i64().map(SqlValue::Int64),
                TypeId::Uint8 => |c| c.get_u8().map(SqlValue::Uint8),
                TypeId::Uint16 => |c| c.get_u16().map(SqlValue::Uint16),
                TypeId::Uint32 => |c| c.get_u32().map(SqlValue::Uint32),
                TypeId::Uint64 => |c| c.get_u64().map(SqlValue::Uint64),
                TypeId::Float => |c| c.get_f32().map(SqlValue::Float),
                TypeId::Double => |c| c.get_f64().map(SqlValue::Double),
                TypeId::String | TypeId::FixedString(_) => {
                    |c| c.get_string().map(SqlValue::String)
                }
                TypeId::Datetime => |c| c.get_datetime().map(SqlValue::Datetime),
                TypeId::DatetimeTz => |c| c.get_datetimetz().map(SqlValue::DatetimeTz),
                TypeId::Binary => |c| c.get_binary().map(SqlValue::Binary),
                TypeId::Indicator | TypeId::Void | TypeId::Other(_) => return None,
            };
            Some(reader)
        })
    }
}

fn type_error(type_id: &TypeId, requested: &'static str) -> ClientError {
    ClientError::Type {
        column_type: type_id.to_string(),
        requested,
    }
}
