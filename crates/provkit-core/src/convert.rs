//! # Value Conversion
//!
//! Moves a [`Value`] to another, compatible [`Type`] through the wire
//! boundary:
//!
//! 1. take the value's wire-type descriptor,
//! 2. serialize the value to its wire form,
//! 3. check the wire form against the target's wire shape,
//! 4. re-frame it as a wire value of the target shape,
//! 5. let the target type materialize the result.
//!
//! Conversion is a pure function of its inputs.

use crate::error::ConversionError;
use crate::path::Path;
use crate::types::Type;
use crate::value::Value;
use crate::wire::{index_to_i64, WireData, WireType, WireValue};

/// Convert `value` to `target`.
///
/// Fails when serialization fails or when the wire shapes are structurally
/// incompatible; the error names the first mismatching position.
pub fn convert(value: &Value, target: &Type) -> Result<Value, ConversionError> {
    let source_type = value.ty().wire_type();
    let wire = value.to_wire()?;
    let target_type = target.wire_type();
    tracing::trace!(source = %source_type, target = %target_type, "converting value");
    let framed = frame(&wire, &target_type, &Path::empty())?;
    target.value_from_wire(&framed)
}

/// Re-frame `value` as a wire value of `expected`, checking shapes as it
/// descends. Null and unknown are re-framed without further checks.
fn frame(value: &WireValue, expected: &WireType, at: &Path) -> Result<WireValue, ConversionError> {
    if expected.is_dynamic() {
        return Ok(value.clone());
    }
    match value.data() {
        WireData::Null => return Ok(WireValue::null(expected.clone())),
        WireData::Unknown => return Ok(WireValue::unknown(expected.clone())),
        _ => {}
    }

    let mismatch = || ConversionError::TypeMismatch {
        position: at.clone(),
        expected: expected.clone(),
        actual: value.ty().clone(),
    };

    let data = match (expected, value.ty(), value.data()) {
        (WireType::String, WireType::String, data)
        | (WireType::Number, WireType::Number, data)
        | (WireType::Bool, WireType::Bool, data) => data.clone(),
        (WireType::List(elem), WireType::List(_), WireData::Elements(items)) => WireData::Elements(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| frame(item, elem, &at.at_list_index(index_to_i64(i))))
                .collect::<Result<_, _>>()?,
        ),
        (WireType::Set(elem), WireType::Set(_), WireData::Elements(items)) => WireData::Elements(
            items
                .iter()
                .map(|item| frame(item, elem, &at.at_set_value(item.clone())))
                .collect::<Result<_, _>>()?,
        ),
        (WireType::Map(elem), WireType::Map(_), WireData::Entries(entries)) => WireData::Entries(
            entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), frame(item, elem, &at.at_map_key(key.clone()))?)))
                .collect::<Result<_, ConversionError>>()?,
        ),
        (WireType::Object(attrs), WireType::Object(_), WireData::Entries(entries)) => {
            if let Some(name) = attrs.keys().find(|n| !entries.contains_key(*n)) {
                return Err(ConversionError::MissingAttribute {
                    position: at.clone(),
                    name: name.clone(),
                });
            }
            if let Some(name) = entries.keys().find(|n| !attrs.contains_key(*n)) {
                return Err(ConversionError::UnexpectedAttribute {
                    position: at.clone(),
                    name: name.clone(),
                });
            }
            WireData::Entries(
                attrs
                    .iter()
                    .filter_map(|(name, attr_ty)| entries.get(name).map(|item| (name, attr_ty, item)))
                    .map(|(name, attr_ty, item)| {
                        Ok((name.clone(), frame(item, attr_ty, &at.attribute(name.clone()))?))
                    })
                    .collect::<Result<_, ConversionError>>()?,
            )
        }
        (WireType::Tuple(types), WireType::Tuple(_), WireData::Elements(items)) => {
            if types.len() != items.len() {
                return Err(ConversionError::LengthMismatch {
                    position: at.clone(),
                    expected: types.len(),
                    actual: items.len(),
                });
            }
            WireData::Elements(
                types
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (ty, item))| frame(item, ty, &at.at_list_index(index_to_i64(i))))
                    .collect::<Result<_, _>>()?,
            )
        }
        _ => return Err(mismatch()),
    };
    WireValue::new_at(expected.clone(), data, at)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn object(pairs: &[(&str, Value)]) -> Value {
        let types: BTreeMap<String, Type> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.ty().clone()))
            .collect();
        let attrs: BTreeMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Value::object(types, attrs).unwrap()
    }

    #[test]
    fn test_convert_to_same_type_is_identity() {
        let value = object(&[
            ("name", Value::string("a")),
            ("tags", Value::list(Type::String, vec![Value::string("x")]).unwrap()),
            ("missing", Value::null(Type::Bool)),
            ("later", Value::unknown(Type::Number)),
        ]);
        let converted = convert(&value, value.ty()).unwrap();
        assert_eq!(converted, value);
    }

    #[test]
    fn test_convert_into_dynamic_element_type() {
        let value = Value::list(Type::String, vec![Value::string("a")]).unwrap();
        let converted = convert(&value, &Type::list(Type::Dynamic)).unwrap();
        assert_eq!(converted.ty(), &Type::list(Type::Dynamic));
        assert_eq!(converted.elements().unwrap()[0].underlying(), &Value::string("a"));
    }

    #[test]
    fn test_convert_null_to_any_type() {
        let converted = convert(&Value::null(Type::String), &Type::set(Type::Bool)).unwrap();
        assert!(converted.is_null());
        assert_eq!(converted.ty(), &Type::set(Type::Bool));

        let converted = convert(&Value::unknown(Type::String), &Type::Number).unwrap();
        assert!(converted.is_unknown());
    }

    #[test]
    fn test_mismatch_names_nested_position() {
        let value = object(&[(
            "items",
            Value::list(Type::String, vec![Value::string("a"), Value::string("b")]).unwrap(),
        )]);
        let target = Type::object([("items", Type::list(Type::Number))]);
        let err = convert(&value, &target).unwrap_err();
        assert_eq!(err.position().to_string(), "items[0]");
        assert!(matches!(err, ConversionError::TypeMismatch { .. }));
    }

    #[test]
    fn test_attribute_set_mismatch() {
        let value = object(&[("a", Value::string("x"))]);
        let err = convert(&value, &Type::object([("a", Type::String), ("b", Type::String)]))
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::MissingAttribute {
                position: Path::empty(),
                name: "b".to_string()
            }
        );

        let err = convert(&value, &Type::object([("z", Type::String)])).unwrap_err();
        assert!(matches!(err, ConversionError::MissingAttribute { ref name, .. } if name == "z"));
    }

    #[test]
    fn test_list_is_not_a_set() {
        let value = Value::list(Type::String, vec![Value::string("a")]).unwrap();
        let err = convert(&value, &Type::set(Type::String)).unwrap_err();
        assert!(err.position().is_empty());
    }
}
