//! Argument checks for loosely-typed input such as JSON documents.
//!
//! Every converter runs a structural check first (is this an array, does it
//! have rows, are the elements of the right kind) and reports it as a type or
//! attribute error. Value constraints are left to the typed operations.

use ndarray::Array2;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::training::Dims2;

/// Human-readable JSON type name for error messages.
const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Rows of a 2D array argument, checked for structure only.
fn rows<'a>(name: &str, value: &'a Value) -> Result<Vec<&'a Vec<Value>>> {
    let Value::Array(outer) = value else {
        return Err(Error::invalid_type(
            name,
            format!("expected a 2D array, got {}", type_name(value)),
        ));
    };
    let rows = outer
        .iter()
        .map(|row| match row {
            Value::Array(row) => Ok(row),
            _ => Err(Error::MissingAttribute {
                name: name.to_string(),
                attribute: "shape".to_string(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    let width = rows.first().map_or(0, |row| row.len());
    if let Some(ragged) = rows.iter().find(|row| row.len() != width) {
        return Err(Error::ShapeMismatch {
            expected: format!("{name} rows of length {width}"),
            actual: format!("a row of length {}", ragged.len()),
        });
    }
    Ok(rows)
}

fn array2<T>(
    name: &str,
    value: &Value,
    element: impl Fn(&Value) -> Option<T>,
    expected: &str,
) -> Result<Array2<T>> {
    let rows = rows(name, value)?;
    let width = rows.first().map_or(0, |row| row.len());
    let data = rows
        .iter()
        .flat_map(|row| row.iter())
        .map(|v| {
            element(v).ok_or_else(|| {
                Error::invalid_type(name, format!("expected {expected} elements, got {}", type_name(v)))
            })
        })
        .collect::<Result<Vec<T>>>()?;

    Array2::from_shape_vec((rows.len(), width), data).map_err(|err| Error::ShapeMismatch {
        expected: format!("[{}, {width}]", rows.len()),
        actual: err.to_string(),
    })
}

/// Convert a JSON array of numeric rows into a matrix.
///
/// # Errors
///
/// Returns a type error if `value` is not an array or holds non-numeric
/// elements, an attribute error if its entries are not rows, and a range
/// error for ragged rows.
#[allow(clippy::cast_possible_truncation)]
pub fn matrix_from_json(name: &str, value: &Value) -> Result<Array2<f32>> {
    array2(name, value, |v| v.as_f64().map(|f| f as f32), "numeric")
}

/// Convert a JSON array of boolean rows into a mask.
///
/// # Errors
///
/// As [`matrix_from_json`], with a type error for non-boolean elements.
pub fn mask_from_json(name: &str, value: &Value) -> Result<Array2<bool>> {
    array2(name, value, Value::as_bool, "boolean")
}

/// Convert a JSON array of strings into class names.
///
/// # Errors
///
/// Returns a type error for `null` or non-string elements and an attribute
/// error for any other value without a length.
pub fn class_names_from_json(name: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Err(Error::invalid_type(name, "expected a list of strings, got null")),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::invalid_type(name, format!("expected strings, got {}", type_name(item)))
                })
            })
            .collect(),
        _ => Err(Error::MissingAttribute {
            name: name.to_string(),
            attribute: "length".to_string(),
        }),
    }
}

/// Convert a JSON pair of integers into [`Dims2`].
///
/// # Errors
///
/// Returns a type error unless `value` is an array of exactly two integers.
pub fn dims_from_json(name: &str, value: &Value) -> Result<Dims2> {
    let Value::Array(items) = value else {
        return Err(Error::invalid_type(
            name,
            format!("expected a pair of integers, got {}", type_name(value)),
        ));
    };
    let values = items
        .iter()
        .map(|item| {
            item.as_i64()
                .ok_or_else(|| Error::invalid_type(name, format!("expected integers, got {item}")))
        })
        .collect::<Result<Vec<i64>>>()?;
    Dims2::try_from(values.as_slice()).map_err(|_| {
        Error::invalid_type(name, format!("expected a pair of integers, got {} values", values.len()))
    })
}

/// Convert a JSON number into an integer count.
///
/// # Errors
///
/// Returns a type error for non-numbers and a range error for numbers with a
/// fractional part.
pub fn integer_from_json(name: &str, value: &Value) -> Result<i64> {
    if let Some(integer) = value.as_i64() {
        return Ok(integer);
    }
    match value.as_f64() {
        Some(number) => Err(Error::invalid_parameter(
            name,
            format!("expected an integer, got {number}"),
        )),
        None => Err(Error::invalid_type(
            name,
            format!("expected an integer, got {}", type_name(value)),
        )),
    }
}
