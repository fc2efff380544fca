//! Cell values.
//!
//! Arrow columns are typed, but quality checks and cleaning need to compare
//! cells across columns of any type: duplicate rows, distinct counts, modes.
//! [`Value`] is the common currency for that. Every cell is an integer, a
//! float, a string or missing. A null slot and a float `NaN` are both
//! missing.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use arrow::{
    array::{
        Array, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array, Int8Array,
        LargeStringArray, StringArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
    },
    datatypes::DataType,
    util::display::array_value_to_string,
};
use serde::Serialize;

/// A single cell of a dataset.
///
/// Equality treats missing as equal to missing, and compares floats by
/// value with `-0.0 == 0.0`, so that two rows read from the same CSV line
/// always compare equal.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer cell (any Arrow integer type).
    Int(i64),
    /// Float cell (any Arrow float type, never NaN).
    Float(f64),
    /// String cell. Non-numeric, non-string Arrow types use their display
    /// form.
    Str(String),
    /// Missing cell.
    Missing,
}

macro_rules! int_value {
    ($array:expr, $idx:expr, $ty:ty) => {
        $array
            .as_any()
            .downcast_ref::<$ty>()
            .map(|arr| Value::Int(i64::from(arr.value($idx))))
    };
}

impl Value {
    /// Reads the cell at `idx` from an Arrow array.
    ///
    /// `idx` must be in bounds.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_array(array: &dyn Array, idx: usize) -> Self {
        if is_null_slot(array, idx) {
            return Self::Missing;
        }

        let value = match array.data_type() {
            DataType::Int8 => int_value!(array, idx, Int8Array),
            DataType::Int16 => int_value!(array, idx, Int16Array),
            DataType::Int32 => int_value!(array, idx, Int32Array),
            DataType::Int64 => int_value!(array, idx, Int64Array),
            DataType::UInt8 => int_value!(array, idx, UInt8Array),
            DataType::UInt16 => int_value!(array, idx, UInt16Array),
            DataType::UInt32 => int_value!(array, idx, UInt32Array),
            DataType::UInt64 => array
                .as_any()
                .downcast_ref::<UInt64Array>()
                .map(|arr| {
                    let v = arr.value(idx);
                    i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
                }),
            DataType::Float32 => array
                .as_any()
                .downcast_ref::<Float32Array>()
                .map(|arr| Self::float(f64::from(arr.value(idx)))),
            DataType::Float64 => array
                .as_any()
                .downcast_ref::<Float64Array>()
                .map(|arr| Self::float(arr.value(idx))),
            DataType::Utf8 => array
                .as_any()
                .downcast_ref::<StringArray>()
                .map(|arr| Value::Str(arr.value(idx).to_string())),
            DataType::LargeUtf8 => array
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| Value::Str(arr.value(idx).to_string())),
            _ => None,
        };

        value.unwrap_or_else(|| {
            Value::Str(
                array_value_to_string(array, idx)
                    .unwrap_or_else(|_| format!("{:?}", array.data_type())),
            )
        })
    }

    /// Reads every cell of an array, in row order.
    pub fn column(array: &dyn Array) -> Vec<Self> {
        (0..array.len()).map(|i| Self::from_array(array, i)).collect()
    }

    fn float(v: f64) -> Self {
        if v.is_nan() {
            Self::Missing
        } else {
            Self::Float(v)
        }
    }

    /// Returns true if the cell is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Numeric view of the cell, if it is an integer or a float.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Str(_) | Self::Missing => None,
        }
    }

    fn normalized_bits(v: f64) -> u64 {
        // -0.0 and 0.0 hash and compare equal
        if v == 0.0 {
            0.0f64.to_bits()
        } else {
            v.to_bits()
        }
    }
}

// A `NullArray` has no validity buffer, so `is_null` reports false for it.
fn is_null_slot(array: &dyn Array, idx: usize) -> bool {
    array.data_type() == &DataType::Null || array.is_null(idx)
}

/// Returns true if the slot at `idx` is missing: null, or `NaN` in a float
/// column.
pub fn is_missing(array: &dyn Array, idx: usize) -> bool {
    if is_null_slot(array, idx) {
        return true;
    }
    match array.data_type() {
        DataType::Float64 => array
            .as_any()
            .downcast_ref::<Float64Array>()
            .is_some_and(|arr| arr.value(idx).is_nan()),
        DataType::Float32 => array
            .as_any()
            .downcast_ref::<Float32Array>()
            .is_some_and(|arr| arr.value(idx).is_nan()),
        _ => false,
    }
}

/// Counts the missing slots of an array.
pub fn missing_count(array: &dyn Array) -> usize {
    match array.data_type() {
        DataType::Float64 | DataType::Float32 => {
            (0..array.len()).filter(|&i| is_missing(array, i)).count()
        }
        DataType::Null => array.len(),
        _ => array.null_count(),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => Self::normalized_bits(*a) == Self::normalized_bits(*b),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Missing, Self::Missing) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Int(v) => v.hash(state),
            Self::Float(v) => Self::normalized_bits(*v).hash(state),
            Self::Str(v) => v.hash(state),
            Self::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
            Self::Missing => write!(f, "null"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}
