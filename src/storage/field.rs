//! Registry entry type.

use core::fmt;

use super::{FieldType, NumericDataField, StringDataField};
use crate::error::DataError;

/// A field registered with a [`DataFieldManager`](super::DataFieldManager).
#[derive(Debug, Clone)]
pub enum DataField {
    Numeric(NumericDataField),
    Text(StringDataField),
}

impl DataField {
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Numeric(field) => field.field_type(),
            Self::Text(field) => field.field_type(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.field_type().label()
    }

    pub fn channel_number(&self) -> u32 {
        match self {
            Self::Numeric(field) => field.channel_number(),
            Self::Text(field) => field.channel_number(),
        }
    }

    pub fn has_data(&self) -> bool {
        match self {
            Self::Numeric(field) => field.has_data(),
            Self::Text(field) => field.has_data(),
        }
    }

    pub fn stored_count(&self) -> usize {
        match self {
            Self::Numeric(field) => field.stored_count(),
            Self::Text(field) => field.stored_count(),
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericDataField> {
        match self {
            Self::Numeric(field) => Some(field),
            Self::Text(_) => None,
        }
    }

    pub fn as_numeric_mut(&mut self) -> Option<&mut NumericDataField> {
        match self {
            Self::Numeric(field) => Some(field),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&StringDataField> {
        match self {
            Self::Text(field) => Some(field),
            Self::Numeric(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut StringDataField> {
        match self {
            Self::Text(field) => Some(field),
            Self::Numeric(_) => None,
        }
    }

    /// Format the value at `index`: converted for numeric fields, verbatim
    /// for text fields.
    pub fn write_data_as_string<W: fmt::Write>(
        &self,
        out: &mut W,
        index: usize,
        decimals: usize,
    ) -> Result<(), DataError> {
        match self {
            Self::Numeric(field) => field.write_converted_as_string(out, index, decimals),
            Self::Text(field) => {
                out.write_str(field.data(index)?)?;
                Ok(())
            }
        }
    }
}

impl From<NumericDataField> for DataField {
    fn from(field: NumericDataField) -> Self {
        Self::Numeric(field)
    }
}

impl From<StringDataField> for DataField {
    fn from(field: StringDataField) -> Self {
        Self::Text(field)
    }
}
