//! # Framework Values
//!
//! [`Value`] is the runtime counterpart of [`Type`]. Every value owns its
//! type and one of three data states: null, unknown, or known. The state is
//! preserved exactly across every conversion; collapsing unknown into null
//! (or the reverse) is a correctness bug.
//!
//! Constructors for collections and objects check element and attribute
//! types, so a `Value` in memory always agrees with its own type.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Number;

use crate::error::ConversionError;
use crate::path::Path;
use crate::types::Type;
use crate::wire::{index_to_i64, WireData, WireValue};

/// Data-presence state of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueState {
    /// Explicitly absent.
    Null,
    /// Not yet resolved; the orchestrator fills it in later.
    Unknown,
    /// Concrete data present.
    Known(KnownValue),
}

/// Concrete payload of a known value.
#[derive(Debug, Clone)]
pub enum KnownValue {
    /// String data.
    String(String),
    /// Boolean data.
    Bool(bool),
    /// Number data.
    Number(Number),
    /// List elements.
    List(Vec<Value>),
    /// Set elements, in insertion order.
    Set(Vec<Value>),
    /// Map entries.
    Map(BTreeMap<String, Value>),
    /// Object attributes.
    Object(BTreeMap<String, Value>),
    /// Tuple elements.
    Tuple(Vec<Value>),
    /// Concrete value held by a dynamic value.
    Dynamic(Box<Value>),
}

impl PartialEq for KnownValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a.len() == b.len() && same_elements(a, b),
            (Self::Map(a), Self::Map(b)) | (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Dynamic(a), Self::Dynamic(b)) => a == b,
            _ => false,
        }
    }
}

/// Order-insensitive comparison that pairs every element of `a` with a
/// distinct element of `b`.
fn same_elements(a: &[Value], b: &[Value]) -> bool {
    let mut unmatched: Vec<&Value> = b.iter().collect();
    a.iter().all(|x| match unmatched.iter().position(|y| x.equal(y)) {
        Some(found) => {
            unmatched.swap_remove(found);
            true
        }
        None => false,
    })
}

/// A typed, tri-state framework value.
#[derive(Clone)]
pub struct Value {
    ty: Type,
    state: ValueState,
}

fn check_element(
    expected: &Type,
    value: &Value,
    position: impl FnOnce() -> Path,
) -> Result<(), ConversionError> {
    if value.ty == *expected {
        Ok(())
    } else {
        Err(ConversionError::ValueType {
            position: position(),
            expected: expected.to_string(),
            actual: value.ty.to_string(),
        })
    }
}

impl Value {
    pub(crate) fn from_parts(ty: Type, state: ValueState) -> Self {
        Self { ty, state }
    }

    /// Re-tag a base value with a custom type wrapping its type.
    pub(crate) fn retyped(self, ty: Type) -> Self {
        Self {
            ty,
            state: self.state,
        }
    }

    /// A null value of `ty`.
    pub fn null(ty: Type) -> Self {
        Self {
            ty,
            state: ValueState::Null,
        }
    }

    /// An unknown value of `ty`.
    pub fn unknown(ty: Type) -> Self {
        Self {
            ty,
            state: ValueState::Unknown,
        }
    }

    /// A known string.
    pub fn string(value: impl Into<String>) -> Self {
        Self::from_parts(Type::String, ValueState::Known(KnownValue::String(value.into())))
    }

    /// A known boolean.
    pub fn bool(value: bool) -> Self {
        Self::from_parts(Type::Bool, ValueState::Known(KnownValue::Bool(value)))
    }

    /// A known number.
    pub fn number(value: impl Into<Number>) -> Self {
        Self::from_parts(Type::Number, ValueState::Known(KnownValue::Number(value.into())))
    }

    /// A known list whose elements all have type `element`.
    pub fn list(element: Type, elements: Vec<Value>) -> Result<Self, ConversionError> {
        for (i, value) in elements.iter().enumerate() {
            check_element(&element, value, || {
                Path::empty().at_list_index(index_to_i64(i))
            })?;
        }
        Ok(Self::from_parts(
            Type::list(element),
            ValueState::Known(KnownValue::List(elements)),
        ))
    }

    /// A known set whose elements all have type `element`.
    pub fn set(element: Type, elements: Vec<Value>) -> Result<Self, ConversionError> {
        for value in &elements {
            check_element(&element, value, || {
                let key = value
                    .to_wire()
                    .unwrap_or_else(|_| WireValue::unknown(value.ty.wire_type()));
                Path::empty().at_set_value(key)
            })?;
        }
        Ok(Self::from_parts(
            Type::set(element),
            ValueState::Known(KnownValue::Set(elements)),
        ))
    }

    /// A known map whose values all have type `element`.
    pub fn map(element: Type, entries: BTreeMap<String, Value>) -> Result<Self, ConversionError> {
        for (key, value) in &entries {
            check_element(&element, value, || Path::empty().at_map_key(key.clone()))?;
        }
        Ok(Self::from_parts(
            Type::map(element),
            ValueState::Known(KnownValue::Map(entries)),
        ))
    }

    /// A known object. The attribute names must match `attribute_types`
    /// exactly and every value must have the declared type.
    pub fn object(
        attribute_types: BTreeMap<String, Type>,
        attributes: BTreeMap<String, Value>,
    ) -> Result<Self, ConversionError> {
        if let Some(name) = attribute_types.keys().find(|n| !attributes.contains_key(*n)) {
            return Err(ConversionError::MissingAttribute {
                position: Path::empty(),
                name: name.clone(),
            });
        }
        if let Some(name) = attributes.keys().find(|n| !attribute_types.contains_key(*n)) {
            return Err(ConversionError::UnexpectedAttribute {
                position: Path::empty(),
                name: name.clone(),
            });
        }
        for (name, ty) in &attribute_types {
            if let Some(value) = attributes.get(name) {
                check_element(ty, value, || Path::empty().attribute(name.clone()))?;
            }
        }
        Ok(Self::from_parts(
            Type::Object(attribute_types),
            ValueState::Known(KnownValue::Object(attributes)),
        ))
    }

    /// A known tuple.
    pub fn tuple(types: Vec<Type>, elements: Vec<Value>) -> Result<Self, ConversionError> {
        if types.len() != elements.len() {
            return Err(ConversionError::LengthMismatch {
                position: Path::empty(),
                expected: types.len(),
                actual: elements.len(),
            });
        }
        for (i, (ty, value)) in types.iter().zip(&elements).enumerate() {
            check_element(ty, value, || Path::empty().at_list_index(index_to_i64(i)))?;
        }
        Ok(Self::from_parts(
            Type::Tuple(types),
            ValueState::Known(KnownValue::Tuple(elements)),
        ))
    }

    /// Wrap a concrete value as a dynamic value. A value that is already
    /// dynamic is returned unchanged.
    pub fn dynamic(inner: Value) -> Self {
        if inner.ty.is_dynamic() {
            return inner;
        }
        Self::from_parts(
            Type::Dynamic,
            ValueState::Known(KnownValue::Dynamic(Box::new(inner))),
        )
    }

    /// Tag `base` with the custom type `ty`, whose base type must be the
    /// type of `base`.
    pub fn custom(ty: Type, base: Value) -> Result<Self, ConversionError> {
        let expected = match &ty {
            Type::Custom(custom) => custom.base_type(),
            other => other.clone(),
        };
        check_element(&expected, &base, Path::empty)?;
        Ok(base.retyped(ty))
    }

    /// Type of this value.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Data state of this value.
    pub fn state(&self) -> &ValueState {
        &self.state
    }

    /// True if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self.state, ValueState::Null)
    }

    /// True if the value is unknown.
    pub fn is_unknown(&self) -> bool {
        matches!(self.state, ValueState::Unknown)
    }

    /// True if concrete data is present.
    pub fn is_known(&self) -> bool {
        matches!(self.state, ValueState::Known(_))
    }

    /// The concrete value behind a dynamic value, or `self`.
    pub fn underlying(&self) -> &Value {
        match &self.state {
            ValueState::Known(KnownValue::Dynamic(inner)) => inner.underlying(),
            _ => self,
        }
    }

    /// String data, if this is a known string.
    pub fn as_str(&self) -> Option<&str> {
        match &self.underlying().state {
            ValueState::Known(KnownValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean data, if this is a known boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match &self.underlying().state {
            ValueState::Known(KnownValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Number data, if this is a known number.
    pub fn as_number(&self) -> Option<&Number> {
        match &self.underlying().state {
            ValueState::Known(KnownValue::Number(n)) => Some(n),
            _ => None,
        }
    }

    /// Elements of a known list, set or tuple.
    pub fn elements(&self) -> Option<&[Value]> {
        match &self.underlying().state {
            ValueState::Known(
                KnownValue::List(items) | KnownValue::Set(items) | KnownValue::Tuple(items),
            ) => Some(items),
            _ => None,
        }
    }

    /// Entries of a known map or object.
    pub fn entries(&self) -> Option<&BTreeMap<String, Value>> {
        match &self.underlying().state {
            ValueState::Known(KnownValue::Map(entries) | KnownValue::Object(entries)) => {
                Some(entries)
            }
            _ => None,
        }
    }

    /// Strict equality: same type, same state, same data. Set elements
    /// compare without regard to order.
    pub fn equal(&self, other: &Value) -> bool {
        self.ty == other.ty && self.state == other.state
    }

    /// Semantic equality. Custom types may relax strict equality; every
    /// other type falls back to [`Value::equal`].
    pub fn semantic_equal(&self, other: &Value) -> bool {
        match &self.ty {
            Type::Custom(custom) if self.ty == other.ty => custom.semantic_equal(self, other),
            _ => self.equal(other),
        }
    }

    /// Serialize to the wire form.
    pub fn to_wire(&self) -> Result<WireValue, ConversionError> {
        self.to_wire_at(&Path::empty())
    }

    fn to_wire_at(&self, at: &Path) -> Result<WireValue, ConversionError> {
        let wire_type = self.ty.wire_type();
        let known = match &self.state {
            ValueState::Null => return Ok(WireValue::null(wire_type)),
            ValueState::Unknown => return Ok(WireValue::unknown(wire_type)),
            ValueState::Known(known) => known,
        };
        let data = match known {
            KnownValue::String(s) => WireData::String(s.clone()),
            KnownValue::Bool(b) => WireData::Bool(*b),
            KnownValue::Number(n) => WireData::Number(n.clone()),
            KnownValue::List(items) | KnownValue::Tuple(items) => WireData::Elements(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| item.to_wire_at(&at.at_list_index(index_to_i64(i))))
                    .collect::<Result<_, _>>()?,
            ),
            KnownValue::Set(items) => WireData::Elements(
                items
                    .iter()
                    .map(|item| item.to_wire_at(at))
                    .collect::<Result<_, _>>()?,
            ),
            KnownValue::Map(entries) => WireData::Entries(
                entries
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), item.to_wire_at(&at.at_map_key(key.clone()))?)))
                    .collect::<Result<_, ConversionError>>()?,
            ),
            KnownValue::Object(entries) => WireData::Entries(
                entries
                    .iter()
                    .map(|(name, item)| Ok((name.clone(), item.to_wire_at(&at.attribute(name.clone()))?)))
                    .collect::<Result<_, ConversionError>>()?,
            ),
            KnownValue::Dynamic(inner) => return inner.to_wire_at(at),
        };
        WireValue::new_at(wire_type, data, at).map_err(|err| ConversionError::Serialization {
            position: at.clone(),
            reason: err.to_string(),
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known = match &self.state {
            ValueState::Null => return f.write_str("<null>"),
            ValueState::Unknown => return f.write_str("<unknown>"),
            ValueState::Known(known) => known,
        };
        match known {
            KnownValue::String(s) => write!(f, "{s:?}"),
            KnownValue::Bool(b) => write!(f, "{b}"),
            KnownValue::Number(n) => write!(f, "{n}"),
            KnownValue::List(items) | KnownValue::Set(items) | KnownValue::Tuple(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            KnownValue::Map(entries) | KnownValue::Object(entries) => {
                f.write_str("{")?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{item}")?;
                }
                f.write_str("}")
            }
            KnownValue::Dynamic(inner) => write!(f, "{inner}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{self}>", self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomType;
    use crate::wire::WireType;

    #[derive(Debug)]
    struct CaseInsensitive;

    impl CustomType for CaseInsensitive {
        fn name(&self) -> &str {
            "CaseInsensitiveType"
        }

        fn base_type(&self) -> Type {
            Type::String
        }

        fn semantic_equal(&self, a: &Value, b: &Value) -> bool {
            match (a.as_str(), b.as_str()) {
                (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
                _ => a.equal(b),
            }
        }
    }

    #[test]
    fn test_list_checks_element_types() {
        let err = Value::list(Type::String, vec![Value::string("a"), Value::bool(true)]).unwrap_err();
        assert_eq!(err.position().to_string(), "[1]");
        assert!(Value::list(Type::String, vec![Value::null(Type::String)]).is_ok());
    }

    #[test]
    fn test_object_checks_attribute_set() {
        let types: BTreeMap<String, Type> = [("a".to_string(), Type::String)].into_iter().collect();
        let err = Value::object(types.clone(), BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ConversionError::MissingAttribute { ref name, .. } if name == "a"));

        let attrs: BTreeMap<String, Value> =
            [("a".to_string(), Value::number(1))].into_iter().collect();
        let err = Value::object(types, attrs).unwrap_err();
        assert_eq!(err.position().to_string(), "a");
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let a = Value::set(Type::String, vec![Value::string("x"), Value::string("y")]).unwrap();
        let b = Value::set(Type::String, vec![Value::string("y"), Value::string("x")]).unwrap();
        assert_eq!(a, b);
        let l1 = Value::list(Type::String, vec![Value::string("x"), Value::string("y")]).unwrap();
        let l2 = Value::list(Type::String, vec![Value::string("y"), Value::string("x")]).unwrap();
        assert_ne!(l1, l2);
    }

    #[test]
    fn test_set_equality_counts_repeats() {
        let strings = |items: &[&str]| {
            Value::set(Type::String, items.iter().map(|s| Value::string(*s)).collect()).unwrap()
        };
        assert_ne!(strings(&["x", "x", "y"]), strings(&["x", "y", "y"]));
        assert_eq!(strings(&["x", "y", "x"]), strings(&["x", "x", "y"]));
    }

    #[test]
    fn test_null_unknown_known_are_distinct() {
        let null = Value::null(Type::String);
        let unknown = Value::unknown(Type::String);
        let known = Value::string("");
        assert_ne!(null, unknown);
        assert_ne!(null, known);
        assert_ne!(unknown, known);
        assert_ne!(Value::null(Type::String), Value::null(Type::Bool));
    }

    #[test]
    fn test_to_wire_preserves_state() {
        let list = Value::list(
            Type::String,
            vec![Value::unknown(Type::String), Value::null(Type::String)],
        )
        .unwrap();
        let wire = list.to_wire().unwrap();
        assert_eq!(wire.ty(), &WireType::List(Box::new(WireType::String)));
        match wire.data() {
            WireData::Elements(items) => {
                assert!(!items[0].is_known());
                assert!(items[1].is_null());
            }
            other => panic!("unexpected data {other:?}"),
        }
    }

    #[test]
    fn test_to_wire_rejects_mixed_dynamic_list() {
        let list = Value::list(
            Type::Dynamic,
            vec![
                Value::dynamic(Value::string("a")),
                Value::dynamic(Value::bool(true)),
            ],
        )
        .unwrap();
        let err = list.to_wire().unwrap_err();
        assert!(matches!(err, ConversionError::Serialization { .. }), "{err}");
    }

    #[test]
    fn test_custom_semantic_equality() {
        let ty = Type::custom(CaseInsensitive);
        let a = Value::custom(ty.clone(), Value::string("Hello")).unwrap();
        let b = Value::custom(ty, Value::string("hello")).unwrap();
        assert!(!a.equal(&b));
        assert!(a.semantic_equal(&b));
        assert!(Value::custom(Type::custom(CaseInsensitive), Value::bool(true)).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::string("test").to_string(), "\"test\"");
        assert_eq!(Value::null(Type::String).to_string(), "<null>");
        let obj = Value::object(
            [("a".to_string(), Type::Bool)].into_iter().collect(),
            [("a".to_string(), Value::bool(true))].into_iter().collect(),
        )
        .unwrap();
        assert_eq!(obj.to_string(), "{\"a\":true}");
        assert_eq!(format!("{:?}", Value::string("x")), "StringType<\"x\">");
    }
}
