//! # Framework Types
//!
//! [`Type`] describes the shape of a value and knows how to move values of
//! that shape across the wire boundary. The set of built-in kinds is closed.
//! Provider-defined semantics enter through [`CustomType`], which wraps a
//! base type and delegates everything it does not override.
//!
//! ## Capabilities
//!
//! - produce a wire-shape descriptor ([`Type::wire_type`]),
//! - validate a wire value ([`Type::validate`]),
//! - materialize a [`Value`] from a wire value ([`Type::value_from_wire`]),
//! - take one path step into a nested type ([`ApplyStep`]).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::diag::Diagnostics;
use crate::error::{ConversionError, StepError};
use crate::path::{Path, Step};
use crate::step::ApplyStep;
use crate::value::{KnownValue, Value, ValueState};
use crate::wire::{index_to_i64, WireData, WireType, WireValue};

/// Provider-defined type wrapping one of the built-in kinds.
///
/// Implementations must be immutable; the same instance is shared by every
/// value and schema that references it.
pub trait CustomType: fmt::Debug + Send + Sync {
    /// Stable, human-readable name, e.g. `TimestampType`.
    fn name(&self) -> &str;

    /// The built-in type this type wraps.
    fn base_type(&self) -> Type;

    /// Extra checks on a wire value, beyond those of the base type.
    fn validate(&self, _value: &WireValue, _path: &Path) -> Diagnostics {
        Diagnostics::new()
    }

    /// Semantic equality between two values of this type. Defaults to
    /// strict equality.
    fn semantic_equal(&self, a: &Value, b: &Value) -> bool {
        a.equal(b)
    }
}

/// A framework type.
#[derive(Debug, Clone)]
pub enum Type {
    /// UTF-8 string.
    String,
    /// Boolean.
    Bool,
    /// Arbitrary number.
    Number,
    /// Type resolved at runtime from the value itself.
    Dynamic,
    /// Ordered collection.
    List(Box<Type>),
    /// Unordered collection.
    Set(Box<Type>),
    /// String-keyed collection.
    Map(Box<Type>),
    /// Fixed set of named attributes.
    Object(BTreeMap<String, Type>),
    /// Fixed sequence of element types.
    Tuple(Vec<Type>),
    /// Provider-defined type.
    Custom(Arc<dyn CustomType>),
}

impl Type {
    /// `ListType[element]`.
    pub fn list(element: Type) -> Self {
        Self::List(Box::new(element))
    }

    /// `SetType[element]`.
    pub fn set(element: Type) -> Self {
        Self::Set(Box::new(element))
    }

    /// `MapType[element]`.
    pub fn map(element: Type) -> Self {
        Self::Map(Box::new(element))
    }

    /// Object type from `(name, type)` pairs.
    pub fn object<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        Self::Object(
            attributes
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    /// Wrap a provider-defined type.
    pub fn custom(custom: impl CustomType + 'static) -> Self {
        Self::Custom(Arc::new(custom))
    }

    /// The wire-shape descriptor of this type.
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::String => WireType::String,
            Self::Bool => WireType::Bool,
            Self::Number => WireType::Number,
            Self::Dynamic => WireType::DynamicPseudoType,
            Self::List(elem) => WireType::List(Box::new(elem.wire_type())),
            Self::Set(elem) => WireType::Set(Box::new(elem.wire_type())),
            Self::Map(elem) => WireType::Map(Box::new(elem.wire_type())),
            Self::Object(attrs) => WireType::Object(
                attrs
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.wire_type()))
                    .collect(),
            ),
            Self::Tuple(elems) => WireType::Tuple(elems.iter().map(Type::wire_type).collect()),
            Self::Custom(custom) => custom.base_type().wire_type(),
        }
    }

    /// The built-in type equivalent to a wire type.
    pub fn from_wire_type(wire: &WireType) -> Self {
        match wire {
            WireType::String => Self::String,
            WireType::Bool => Self::Bool,
            WireType::Number => Self::Number,
            WireType::DynamicPseudoType => Self::Dynamic,
            WireType::List(elem) => Self::list(Self::from_wire_type(elem)),
            WireType::Set(elem) => Self::set(Self::from_wire_type(elem)),
            WireType::Map(elem) => Self::map(Self::from_wire_type(elem)),
            WireType::Object(attrs) => Self::Object(
                attrs
                    .iter()
                    .map(|(name, ty)| (name.clone(), Self::from_wire_type(ty)))
                    .collect(),
            ),
            WireType::Tuple(elems) => Self::Tuple(elems.iter().map(Self::from_wire_type).collect()),
        }
    }

    /// Short kind name, e.g. `ListType` or `StringType`.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::String => "StringType",
            Self::Bool => "BoolType",
            Self::Number => "NumberType",
            Self::Dynamic => "DynamicType",
            Self::List(_) => "ListType",
            Self::Set(_) => "SetType",
            Self::Map(_) => "MapType",
            Self::Object(_) => "ObjectType",
            Self::Tuple(_) => "TupleType",
            Self::Custom(custom) => custom.name(),
        }
    }

    /// True for [`Type::Dynamic`] only.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    /// Element type of a list, set or map, looking through custom types.
    pub fn element_type(&self) -> Option<Type> {
        match self {
            Self::List(elem) | Self::Set(elem) | Self::Map(elem) => Some((**elem).clone()),
            Self::Custom(custom) => custom.base_type().element_type(),
            _ => None,
        }
    }

    /// True if this type is a collection with a dynamic type anywhere below
    /// it, or a structural type containing such a collection.
    ///
    /// A top-level dynamic type, or an object with a dynamic attribute, is
    /// not a collection and reports false.
    pub fn contains_collection_with_dynamic(&self) -> bool {
        match self {
            Self::List(elem) | Self::Set(elem) | Self::Map(elem) => elem.contains_dynamic(),
            Self::Object(attrs) => attrs.values().any(Type::contains_collection_with_dynamic),
            Self::Tuple(elems) => elems.iter().any(Type::contains_collection_with_dynamic),
            Self::Custom(custom) => custom.base_type().contains_collection_with_dynamic(),
            _ => false,
        }
    }

    /// True if a dynamic type appears anywhere in this type.
    pub fn contains_dynamic(&self) -> bool {
        match self {
            Self::Dynamic => true,
            Self::List(elem) | Self::Set(elem) | Self::Map(elem) => elem.contains_dynamic(),
            Self::Object(attrs) => attrs.values().any(Type::contains_dynamic),
            Self::Tuple(elems) => elems.iter().any(Type::contains_dynamic),
            Self::Custom(custom) => custom.base_type().contains_dynamic(),
            _ => false,
        }
    }

    /// Run type-level validation of a wire value located at `path`.
    ///
    /// Built-in kinds descend into known collection elements so nested
    /// custom types are reached. Sets also report every repeat of a fully
    /// known element; elements that are not fully known are skipped.
    pub fn validate(&self, value: &WireValue, path: &Path) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match (self, value.data()) {
            (Self::Custom(custom), _) => {
                diags.append(custom.validate(value, path));
                diags.append(custom.base_type().validate(value, path));
            }
            (Self::List(elem), WireData::Elements(items)) => {
                for (index, item) in items.iter().enumerate() {
                    diags.append(elem.validate(item, &path.at_list_index(index_to_i64(index))));
                }
            }
            (Self::Set(elem), WireData::Elements(items)) => {
                for (index, item) in items.iter().enumerate() {
                    if !item.is_fully_known() {
                        continue;
                    }
                    diags.append(elem.validate(item, &path.at_set_value(item.clone())));
                    for duplicate in items[index + 1..].iter().filter(|other| *other == item) {
                        diags.add_attribute_error(
                            path.clone(),
                            "Duplicate Set Element",
                            format!("This attribute contains duplicate values of: {duplicate}"),
                        );
                    }
                }
            }
            (Self::Map(elem), WireData::Entries(entries)) => {
                for (key, item) in entries {
                    diags.append(elem.validate(item, &path.at_map_key(key.clone())));
                }
            }
            (Self::Object(attrs), WireData::Entries(entries)) => {
                for (name, ty) in attrs {
                    if let Some(item) = entries.get(name) {
                        diags.append(ty.validate(item, &path.attribute(name.clone())));
                    }
                }
            }
            (Self::Tuple(types), WireData::Elements(items)) => {
                for (index, (ty, item)) in types.iter().zip(items).enumerate() {
                    diags.append(ty.validate(item, &path.at_list_index(index_to_i64(index))));
                }
            }
            _ => {}
        }
        diags
    }

    /// Materialize a [`Value`] of this type from a wire value.
    ///
    /// Null and unknown are preserved exactly. The wire value's type must be
    /// usable as this type's wire type.
    pub fn value_from_wire(&self, wire: &WireValue) -> Result<Value, ConversionError> {
        self.value_from_wire_at(wire, &Path::empty())
    }

    pub(crate) fn value_from_wire_at(
        &self,
        wire: &WireValue,
        at: &Path,
    ) -> Result<Value, ConversionError> {
        match self {
            Self::Dynamic => return dynamic_from_wire(wire, at),
            Self::Custom(custom) => {
                let base = custom.base_type().value_from_wire_at(wire, at)?;
                return Ok(base.retyped(self.clone()));
            }
            _ => {}
        }

        let expected = self.wire_type();
        if !wire.ty().usable_as(&expected) {
            return Err(ConversionError::TypeMismatch {
                position: at.clone(),
                expected,
                actual: wire.ty().clone(),
            });
        }

        let known = match (self, wire.data()) {
            (_, WireData::Null) => return Ok(Value::null(self.clone())),
            (_, WireData::Unknown) => return Ok(Value::unknown(self.clone())),
            (Self::String, WireData::String(s)) => KnownValue::String(s.clone()),
            (Self::Number, WireData::Number(n)) => KnownValue::Number(n.clone()),
            (Self::Bool, WireData::Bool(b)) => KnownValue::Bool(*b),
            (Self::List(elem), WireData::Elements(items)) => KnownValue::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| elem.value_from_wire_at(item, &at.at_list_index(index_to_i64(i))))
                    .collect::<Result<_, _>>()?,
            ),
            (Self::Set(elem), WireData::Elements(items)) => KnownValue::Set(
                items
                    .iter()
                    .map(|item| elem.value_from_wire_at(item, &at.at_set_value(item.clone())))
                    .collect::<Result<_, _>>()?,
            ),
            (Self::Map(elem), WireData::Entries(entries)) => KnownValue::Map(
                entries
                    .iter()
                    .map(|(key, item)| {
                        let value = elem.value_from_wire_at(item, &at.at_map_key(key.clone()))?;
                        Ok((key.clone(), value))
                    })
                    .collect::<Result<_, ConversionError>>()?,
            ),
            (Self::Object(attrs), WireData::Entries(entries)) => KnownValue::Object(
                attrs
                    .iter()
                    .map(|(name, ty)| {
                        let item = entries.get(name).ok_or_else(|| {
                            ConversionError::MissingAttribute {
                                position: at.clone(),
                                name: name.clone(),
                            }
                        })?;
                        let value = ty.value_from_wire_at(item, &at.attribute(name.clone()))?;
                        Ok((name.clone(), value))
                    })
                    .collect::<Result<_, ConversionError>>()?,
            ),
            (Self::Tuple(types), WireData::Elements(items)) => {
                if types.len() != items.len() {
                    return Err(ConversionError::LengthMismatch {
                        position: at.clone(),
                        expected: types.len(),
                        actual: items.len(),
                    });
                }
                KnownValue::Tuple(
                    types
                        .iter()
                        .zip(items)
                        .enumerate()
                        .map(|(i, (ty, item))| {
                            ty.value_from_wire_at(item, &at.at_list_index(index_to_i64(i)))
                        })
                        .collect::<Result<_, _>>()?,
                )
            }
            (_, data) => {
                return Err(ConversionError::DataMismatch {
                    position: at.clone(),
                    expected,
                    found: data.kind_name(),
                })
            }
        };
        Ok(Value::from_parts(self.clone(), ValueState::Known(known)))
    }
}

fn dynamic_from_wire(wire: &WireValue, at: &Path) -> Result<Value, ConversionError> {
    if wire.ty().is_dynamic() {
        return match wire.data() {
            WireData::Null => Ok(Value::null(Type::Dynamic)),
            WireData::Unknown => Ok(Value::unknown(Type::Dynamic)),
            _ => Err(ConversionError::AmbiguousDynamic {
                position: at.clone(),
            }),
        };
    }
    let concrete = Type::from_wire_type(wire.ty());
    let inner = concrete.value_from_wire_at(wire, at)?;
    Ok(Value::dynamic(inner))
}

impl ApplyStep for Type {
    type Output = Type;

    fn apply_step(&self, step: &Step) -> Result<Type, StepError> {
        match (self, step) {
            (Self::Dynamic, _) => Ok(Self::Dynamic),
            (Self::List(elem), Step::ElementKeyInt(_))
            | (Self::Set(elem), Step::ElementKeyValue(_))
            | (Self::Map(elem), Step::ElementKeyString(_)) => Ok((**elem).clone()),
            (Self::Object(attrs), Step::AttributeName(name)) => attrs
                .get(name)
                .cloned()
                .ok_or_else(|| StepError::UndefinedAttribute { name: name.clone() }),
            (Self::Tuple(elems), Step::ElementKeyInt(index)) => usize::try_from(*index)
                .ok()
                .and_then(|i| elems.get(i))
                .cloned()
                .ok_or_else(|| StepError::IndexOutOfRange {
                    index: *index,
                    target: self.to_string(),
                }),
            (Self::Custom(custom), _) => custom.base_type().apply_step(step),
            (Self::List(_) | Self::Set(_) | Self::Map(_) | Self::Object(_) | Self::Tuple(_), _) => {
                Err(StepError::Inapplicable {
                    step: step.kind(),
                    target: self.kind_name().to_string(),
                })
            }
            _ => Err(StepError::Unsupported {
                step: step.kind(),
                target: self.to_string(),
            }),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String, Self::String)
            | (Self::Bool, Self::Bool)
            | (Self::Number, Self::Number)
            | (Self::Dynamic, Self::Dynamic) => true,
            (Self::List(a), Self::List(b))
            | (Self::Set(a), Self::Set(b))
            | (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => {
                Arc::ptr_eq(a, b) || (a.name() == b.name() && a.base_type() == b.base_type())
            }
            _ => false,
        }
    }
}

impl Eq for Type {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(elem) | Self::Set(elem) | Self::Map(elem) => {
                write!(f, "{}[{elem}]", self.kind_name())
            }
            Self::Object(attrs) => {
                f.write_str("ObjectType[")?;
                for (i, (name, ty)) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name:?}:{ty}")?;
                }
                f.write_str("]")
            }
            Self::Tuple(elems) => {
                f.write_str("TupleType[")?;
                for (i, ty) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                f.write_str("]")
            }
            _ => f.write_str(self.kind_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::walk_path;

    #[derive(Debug)]
    struct UpperString;

    impl CustomType for UpperString {
        fn name(&self) -> &str {
            "UpperStringType"
        }

        fn base_type(&self) -> Type {
            Type::String
        }

        fn validate(&self, value: &WireValue, path: &Path) -> Diagnostics {
            let mut diags = Diagnostics::new();
            if let WireData::String(s) = value.data() {
                if s.chars().any(char::is_lowercase) {
                    diags.add_attribute_error(path.clone(), "Invalid Value", "must be upper case");
                }
            }
            diags
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::list(Type::String).to_string(), "ListType[StringType]");
        assert_eq!(
            Type::object([("a", Type::String), ("b", Type::Bool)]).to_string(),
            "ObjectType[\"a\":StringType, \"b\":BoolType]"
        );
        assert_eq!(Type::custom(UpperString).to_string(), "UpperStringType");
    }

    #[test]
    fn test_collection_steps() {
        let list = Type::list(Type::String);
        assert_eq!(list.apply_step(&Step::ElementKeyInt(0)), Ok(Type::String));
        let err = list
            .apply_step(&Step::AttributeName("x".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot apply step AttributeName to ListType");

        let map = Type::map(Type::Bool);
        let err = map.apply_step(&Step::ElementKeyInt(0)).unwrap_err();
        assert_eq!(err.to_string(), "cannot apply step ElementKeyInt to MapType");

        let set = Type::set(Type::Bool);
        assert_eq!(
            set.apply_step(&Step::ElementKeyValue(WireValue::bool(true))),
            Ok(Type::Bool)
        );
    }

    #[test]
    fn test_object_and_primitive_steps() {
        let object = Type::object([("a", Type::Number)]);
        let err = object
            .apply_step(&Step::AttributeName("other".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "undefined attribute name other in ObjectType");
        let err = object
            .apply_step(&Step::ElementKeyString("a".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot apply step ElementKeyString to ObjectType");

        let err = Type::String
            .apply_step(&Step::AttributeName("x".to_string()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot apply AttributePathStep AttributeName to StringType"
        );
        assert_eq!(Type::Dynamic.apply_step(&Step::ElementKeyInt(4)), Ok(Type::Dynamic));
    }

    #[test]
    fn test_tuple_index_bounds() {
        let tuple = Type::Tuple(vec![Type::String, Type::Bool]);
        assert_eq!(tuple.apply_step(&Step::ElementKeyInt(1)), Ok(Type::Bool));
        assert!(matches!(
            tuple.apply_step(&Step::ElementKeyInt(2)),
            Err(StepError::IndexOutOfRange { index: 2, .. })
        ));
        assert!(tuple.apply_step(&Step::ElementKeyInt(-1)).is_err());
    }

    #[test]
    fn test_walk_nested_type() {
        let ty = Type::object([("items", Type::list(Type::map(Type::String)))]);
        let path = Path::empty().attribute("items").at_list_index(0).at_map_key("k");
        assert_eq!(walk_path(ty.clone(), &path).unwrap(), Type::String);

        let bad = Path::empty().attribute("items").attribute("oops").at_list_index(1);
        let err = walk_path(ty, &bad).unwrap_err();
        assert_eq!(err.step, Step::AttributeName("oops".to_string()));
        assert_eq!(err.remaining, Path::empty().at_list_index(1));
        assert_eq!(err.path, bad);
    }

    #[test]
    fn test_contains_collection_with_dynamic() {
        assert!(!Type::Dynamic.contains_collection_with_dynamic());
        assert!(!Type::String.contains_collection_with_dynamic());
        assert!(Type::list(Type::Dynamic).contains_collection_with_dynamic());
        assert!(Type::map(Type::object([("a", Type::Dynamic)])).contains_collection_with_dynamic());
        assert!(Type::set(Type::Tuple(vec![Type::Dynamic])).contains_collection_with_dynamic());
        assert!(!Type::object([("a", Type::Dynamic)]).contains_collection_with_dynamic());
        assert!(Type::object([("a", Type::list(Type::Dynamic))]).contains_collection_with_dynamic());
        assert!(Type::Tuple(vec![Type::set(Type::Dynamic)]).contains_collection_with_dynamic());
    }

    #[test]
    fn test_value_from_wire_preserves_tri_state() {
        let null = Type::String.value_from_wire(&WireValue::null(WireType::String)).unwrap();
        assert!(null.is_null());
        let unknown = Type::String
            .value_from_wire(&WireValue::unknown(WireType::String))
            .unwrap();
        assert!(unknown.is_unknown());
        assert!(!unknown.is_null());
    }

    #[test]
    fn test_value_from_wire_rejects_wrong_type() {
        let err = Type::list(Type::String)
            .value_from_wire(&WireValue::string("wrong"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "(root): can't use String as value of List[String]"
        );
    }

    #[test]
    fn test_dynamic_from_wire() {
        let value = Type::Dynamic
            .value_from_wire(&WireValue::string("x"))
            .unwrap();
        assert_eq!(value.ty(), &Type::Dynamic);
        assert_eq!(value.underlying().ty(), &Type::String);

        let null = Type::Dynamic
            .value_from_wire(&WireValue::null(WireType::DynamicPseudoType))
            .unwrap();
        assert!(null.is_null());

        let typed_null = Type::Dynamic
            .value_from_wire(&WireValue::null(WireType::String))
            .unwrap();
        assert!(!typed_null.is_null());
        assert!(typed_null.underlying().is_null());
        assert_eq!(typed_null.underlying().ty(), &Type::String);
    }

    #[test]
    fn test_custom_type_validate_reaches_nested_elements() {
        let ty = Type::list(Type::custom(UpperString));
        let wire = WireValue::list(
            WireType::String,
            vec![WireValue::string("OK"), WireValue::string("no")],
        )
        .unwrap();
        let diags = ty.validate(&wire, &Path::empty().attribute("names"));
        assert_eq!(diags.len(), 1);
        let path = diags.iter().next().and_then(|d| d.path.clone()).unwrap();
        assert_eq!(path.to_string(), "names[1]");

        let value = ty.value_from_wire(&wire).unwrap();
        assert_eq!(value.elements().unwrap()[0].ty(), &Type::custom(UpperString));
    }

    #[test]
    fn test_set_validate_reports_duplicates() {
        let wire = WireValue::set(
            WireType::String,
            vec![
                WireValue::string("a"),
                WireValue::string("b"),
                WireValue::string("a"),
                WireValue::unknown(WireType::String),
                WireValue::unknown(WireType::String),
            ],
        )
        .unwrap();
        let path = Path::empty().attribute("tags");
        let diags = Type::set(Type::String).validate(&wire, &path);
        assert_eq!(diags.len(), 1);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "Duplicate Set Element");
        assert_eq!(diag.detail, "This attribute contains duplicate values of: \"a\"");
        assert_eq!(diag.path.as_ref(), Some(&path));

        let distinct = WireValue::set(
            WireType::String,
            vec![WireValue::string("a"), WireValue::string("b")],
        )
        .unwrap();
        assert!(Type::set(Type::String).validate(&distinct, &path).is_empty());
    }
}
