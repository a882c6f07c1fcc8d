//! Accumulation of sequence elements into typed arrays.

use crate::classify::{ScalarValue, ValueType};
use crate::error::{ParamError, Result};
use crate::types::ParameterValue;

fn push_checked<T>(items: &mut Vec<T>, item: T) -> Result<()> {
    items
        .try_reserve(1)
        .map_err(|e| ParamError::alloc("array", e))?;
    items.push(item);
    Ok(())
}

/// Append one classified element to the array held in `slot`.
///
/// `seq_type` is `None` at the start of a sequence. The first element fixes
/// it and replaces whatever `slot` held with a one-element array. Any later
/// element of a different type is rejected and the array is left as it was.
pub fn append_value(
    slot: &mut ParameterValue,
    value: ScalarValue,
    seq_type: &mut Option<ValueType>,
    line: usize,
) -> Result<()> {
    let value_type = value.value_type();

    let Some(expected) = *seq_type else {
        *slot = match value {
            ScalarValue::Bool(b) => ParameterValue::BoolArray(vec![b]),
            ScalarValue::Integer(i) => ParameterValue::IntegerArray(vec![i]),
            ScalarValue::Double(d) => ParameterValue::DoubleArray(vec![d]),
            ScalarValue::String(s) => ParameterValue::StringArray(vec![s]),
        };
        *seq_type = Some(value_type);
        return Ok(());
    };

    if expected != value_type {
        return Err(ParamError::Parse(format!(
            "Sequence should be of same type. Value type '{}' do not belong at line_num {}",
            value_type, line
        )));
    }

    match (slot, value) {
        (ParameterValue::BoolArray(items), ScalarValue::Bool(b)) => push_checked(items, b),
        (ParameterValue::IntegerArray(items), ScalarValue::Integer(i)) => push_checked(items, i),
        (ParameterValue::DoubleArray(items), ScalarValue::Double(d)) => push_checked(items, d),
        (ParameterValue::StringArray(items), ScalarValue::String(s)) => push_checked(items, s),
        (other, _) => Err(ParamError::Parse(format!(
            "Parameter holds a {} while appending {} elements at line {}",
            other.parameter_type(),
            value_type,
            line
        ))),
    }
}
