//! # Wire Boundary
//!
//! The transport-level representation of data exchanged with the
//! orchestrator: a shape descriptor ([`WireType`]) and a typed value
//! ([`WireValue`]) holding null, unknown, or known data.
//!
//! The byte encoding belongs to the transport. This module only describes
//! shapes, validates data against them, and frames raw data as a value of a
//! given shape.
//!
//! ## Invariant
//!
//! A `WireValue` can only be obtained through a validating constructor, so
//! every value in memory conforms to its own type. Unknown and null stay
//! distinct through every operation.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Number;

use crate::error::ConversionError;
use crate::path::Path;

/// Shape descriptor of a wire value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireType {
    /// UTF-8 string.
    String,
    /// Arbitrary number.
    Number,
    /// Boolean.
    Bool,
    /// Placeholder for a type only known at runtime.
    DynamicPseudoType,
    /// Ordered collection of one element type.
    List(Box<WireType>),
    /// Unordered collection of one element type.
    Set(Box<WireType>),
    /// String-keyed collection of one element type.
    Map(Box<WireType>),
    /// Fixed set of named attributes.
    Object(BTreeMap<String, WireType>),
    /// Fixed sequence of element types.
    Tuple(Vec<WireType>),
}

impl WireType {
    /// Returns true for [`WireType::DynamicPseudoType`].
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::DynamicPseudoType)
    }

    /// Whether a value of this type may stand where `other` is expected.
    ///
    /// Structural comparison, except that any type is usable where the
    /// dynamic pseudo type is expected.
    pub fn usable_as(&self, other: &WireType) -> bool {
        match (self, other) {
            (_, Self::DynamicPseudoType) => true,
            (Self::List(a), Self::List(b))
            | (Self::Set(a), Self::Set(b))
            | (Self::Map(a), Self::Map(b)) => a.usable_as(b),
            (Self::Object(a), Self::Object(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(name, ty)| b.get(name).is_some_and(|o| ty.usable_as(o)))
            }
            (Self::Tuple(a), Self::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.usable_as(y))
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Number => f.write_str("Number"),
            Self::Bool => f.write_str("Bool"),
            Self::DynamicPseudoType => f.write_str("DynamicPseudoType"),
            Self::List(elem) => write!(f, "List[{elem}]"),
            Self::Set(elem) => write!(f, "Set[{elem}]"),
            Self::Map(elem) => write!(f, "Map[{elem}]"),
            Self::Object(attrs) => {
                f.write_str("Object[")?;
                for (i, (name, ty)) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name:?}:{ty}")?;
                }
                f.write_str("]")
            }
            Self::Tuple(elems) => {
                f.write_str("Tuple[")?;
                for (i, ty) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Raw payload of a wire value. Collections share two shapes: ordered
/// elements (list, set, tuple) and named entries (map, object).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireData {
    /// Explicitly absent.
    Null,
    /// Not yet resolved.
    Unknown,
    /// String payload.
    String(String),
    /// Number payload.
    Number(Number),
    /// Boolean payload.
    Bool(bool),
    /// Elements of a list, set, or tuple.
    Elements(Vec<WireValue>),
    /// Entries of a map or object.
    Entries(BTreeMap<String, WireValue>),
}

impl WireData {
    /// Short name of the payload kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Unknown => "unknown",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Elements(_) => "elements",
            Self::Entries(_) => "entries",
        }
    }
}

/// A typed, tri-state value as it crosses the transport boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct WireValue {
    ty: WireType,
    data: WireData,
}

impl WireValue {
    /// Frame `data` as a value of `ty`, validating it against the shape.
    pub fn new(ty: WireType, data: WireData) -> Result<Self, ConversionError> {
        Self::new_at(ty, data, &Path::empty())
    }

    /// Like [`WireValue::new`], reporting errors relative to `at`.
    pub(crate) fn new_at(ty: WireType, data: WireData, at: &Path) -> Result<Self, ConversionError> {
        validate(&ty, &data, at)?;
        Ok(Self { ty, data })
    }

    /// A null value of the given type.
    pub fn null(ty: WireType) -> Self {
        Self {
            ty,
            data: WireData::Null,
        }
    }

    /// An unknown value of the given type.
    pub fn unknown(ty: WireType) -> Self {
        Self {
            ty,
            data: WireData::Unknown,
        }
    }

    /// A known string.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            ty: WireType::String,
            data: WireData::String(value.into()),
        }
    }

    /// A known number.
    pub fn number(value: impl Into<Number>) -> Self {
        Self {
            ty: WireType::Number,
            data: WireData::Number(value.into()),
        }
    }

    /// A known boolean.
    pub fn bool(value: bool) -> Self {
        Self {
            ty: WireType::Bool,
            data: WireData::Bool(value),
        }
    }

    /// A known list.
    pub fn list(element: WireType, elements: Vec<WireValue>) -> Result<Self, ConversionError> {
        Self::new(WireType::List(Box::new(element)), WireData::Elements(elements))
    }

    /// A known set.
    pub fn set(element: WireType, elements: Vec<WireValue>) -> Result<Self, ConversionError> {
        Self::new(WireType::Set(Box::new(element)), WireData::Elements(elements))
    }

    /// A known map.
    pub fn map(
        element: WireType,
        entries: BTreeMap<String, WireValue>,
    ) -> Result<Self, ConversionError> {
        Self::new(WireType::Map(Box::new(element)), WireData::Entries(entries))
    }

    /// A known object.
    pub fn object(
        attribute_types: BTreeMap<String, WireType>,
        attributes: BTreeMap<String, WireValue>,
    ) -> Result<Self, ConversionError> {
        Self::new(WireType::Object(attribute_types), WireData::Entries(attributes))
    }

    /// A known tuple.
    pub fn tuple(types: Vec<WireType>, elements: Vec<WireValue>) -> Result<Self, ConversionError> {
        Self::new(WireType::Tuple(types), WireData::Elements(elements))
    }

    /// Shape of this value.
    pub fn ty(&self) -> &WireType {
        &self.ty
    }

    /// Raw payload of this value.
    pub fn data(&self) -> &WireData {
        &self.data
    }

    /// Consume the value into its type and payload.
    pub fn into_parts(self) -> (WireType, WireData) {
        (self.ty, self.data)
    }

    /// True if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self.data, WireData::Null)
    }

    /// True unless the value itself is unknown. Children may still be unknown.
    pub fn is_known(&self) -> bool {
        !matches!(self.data, WireData::Unknown)
    }

    /// True if neither the value nor any nested value is unknown.
    pub fn is_fully_known(&self) -> bool {
        match &self.data {
            WireData::Unknown => false,
            WireData::Elements(items) => items.iter().all(Self::is_fully_known),
            WireData::Entries(entries) => entries.values().all(Self::is_fully_known),
            _ => true,
        }
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            WireData::Null => f.write_str("<null>"),
            WireData::Unknown => f.write_str("<unknown>"),
            WireData::String(s) => write!(f, "{s:?}"),
            WireData::Number(n) => write!(f, "{n}"),
            WireData::Bool(b) => write!(f, "{b}"),
            WireData::Elements(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            WireData::Entries(entries) => {
                f.write_str("{")?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Debug for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            WireData::Null => write!(f, "{}<null>", self.ty),
            WireData::Unknown => write!(f, "{}<unknown>", self.ty),
            _ => write!(f, "{}<{self}>", self.ty),
        }
    }
}

fn element_position(ty: &WireType, at: &Path, index: usize, element: &WireValue) -> Path {
    match ty {
        WireType::Set(_) => at.at_set_value(element.clone()),
        _ => at.at_list_index(index_to_i64(index)),
    }
}

pub(crate) fn index_to_i64(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Tracks the concrete type shared by elements of a dynamically typed
/// collection.
struct Uniform<'a> {
    dynamic: bool,
    first: Option<&'a WireType>,
}

impl<'a> Uniform<'a> {
    fn new(element: &WireType) -> Self {
        Self {
            dynamic: element.is_dynamic(),
            first: None,
        }
    }

    fn check(&mut self, ty: &'a WireType, position: &Path) -> Result<(), ConversionError> {
        if !self.dynamic {
            return Ok(());
        }
        match self.first {
            None => {
                self.first = Some(ty);
                Ok(())
            }
            Some(first) if first == ty => Ok(()),
            Some(first) => Err(ConversionError::MixedElements {
                position: position.clone(),
                expected: first.clone(),
                actual: ty.clone(),
            }),
        }
    }
}

fn check_usable(value: &WireValue, expected: &WireType, position: &Path) -> Result<(), ConversionError> {
    if value.ty.usable_as(expected) {
        Ok(())
    } else {
        Err(ConversionError::TypeMismatch {
            position: position.clone(),
            expected: expected.clone(),
            actual: value.ty.clone(),
        })
    }
}

fn validate(ty: &WireType, data: &WireData, at: &Path) -> Result<(), ConversionError> {
    match (ty, data) {
        (_, WireData::Null | WireData::Unknown) => Ok(()),
        (WireType::DynamicPseudoType, _) => Err(ConversionError::AmbiguousDynamic {
            position: at.clone(),
        }),
        (WireType::String, WireData::String(_))
        | (WireType::Number, WireData::Number(_))
        | (WireType::Bool, WireData::Bool(_)) => Ok(()),
        (WireType::List(element) | WireType::Set(element), WireData::Elements(items)) => {
            let mut uniform = Uniform::new(element);
            for (index, item) in items.iter().enumerate() {
                let position = element_position(ty, at, index, item);
                check_usable(item, element, &position)?;
                uniform.check(&item.ty, &position)?;
            }
            Ok(())
        }
        (WireType::Map(element), WireData::Entries(entries)) => {
            let mut uniform = Uniform::new(element);
            for (key, item) in entries {
                let position = at.at_map_key(key.clone());
                check_usable(item, element, &position)?;
                uniform.check(&item.ty, &position)?;
            }
            Ok(())
        }
        (WireType::Object(attrs), WireData::Entries(entries)) => {
            if let Some(name) = attrs.keys().find(|name| !entries.contains_key(*name)) {
                return Err(ConversionError::MissingAttribute {
                    position: at.clone(),
                    name: name.clone(),
                });
            }
            if let Some(name) = entries.keys().find(|name| !attrs.contains_key(*name)) {
                return Err(ConversionError::UnexpectedAttribute {
                    position: at.clone(),
                    name: name.clone(),
                });
            }
            for (name, attr_ty) in attrs {
                if let Some(item) = entries.get(name) {
                    check_usable(item, attr_ty, &at.attribute(name.clone()))?;
                }
            }
            Ok(())
        }
        (WireType::Tuple(types), WireData::Elements(items)) => {
            if types.len() != items.len() {
                return Err(ConversionError::LengthMismatch {
                    position: at.clone(),
                    expected: types.len(),
                    actual: items.len(),
                });
            }
            for (index, (item, elem_ty)) in items.iter().zip(types).enumerate() {
                check_usable(item, elem_ty, &at.at_list_index(index_to_i64(index)))?;
            }
            Ok(())
        }
        _ => Err(ConversionError::DataMismatch {
            position: at.clone(),
            expected: ty.clone(),
            found: data.kind_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<WireValue> {
        values.iter().map(|s| WireValue::string(*s)).collect()
    }

    #[test]
    fn test_list_rejects_wrong_element_type() {
        let err = WireValue::list(WireType::String, vec![WireValue::number(1)]).unwrap_err();
        assert!(
            matches!(err, ConversionError::TypeMismatch { .. }),
            "unexpected error: {err}"
        );
        assert_eq!(err.position().to_string(), "[0]");
    }

    #[test]
    fn test_dynamic_list_requires_uniform_elements() {
        let ok = WireValue::list(WireType::DynamicPseudoType, strings(&["a", "b"]));
        assert!(ok.is_ok());

        let err = WireValue::list(
            WireType::DynamicPseudoType,
            vec![WireValue::string("a"), WireValue::bool(true)],
        )
        .unwrap_err();
        assert!(matches!(err, ConversionError::MixedElements { .. }));
        assert_eq!(err.position().to_string(), "[1]");
    }

    #[test]
    fn test_object_requires_exact_attributes() {
        let types: BTreeMap<_, _> = [
            ("a".to_string(), WireType::String),
            ("b".to_string(), WireType::Bool),
        ]
        .into_iter()
        .collect();
        let values: BTreeMap<_, _> = [("a".to_string(), WireValue::string("x"))]
            .into_iter()
            .collect();

        let err = WireValue::object(types.clone(), values.clone()).unwrap_err();
        assert_eq!(
            err,
            ConversionError::MissingAttribute {
                position: Path::empty(),
                name: "b".to_string()
            }
        );

        let mut extra = values;
        extra.insert("b".to_string(), WireValue::bool(false));
        extra.insert("c".to_string(), WireValue::bool(false));
        let err = WireValue::object(types, extra).unwrap_err();
        assert!(matches!(err, ConversionError::UnexpectedAttribute { ref name, .. } if name == "c"));
    }

    #[test]
    fn test_known_dynamic_is_ambiguous() {
        let err = WireValue::new(
            WireType::DynamicPseudoType,
            WireData::String("x".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, ConversionError::AmbiguousDynamic { .. }));

        let null = WireValue::null(WireType::DynamicPseudoType);
        assert!(null.is_null());
        assert!(null.is_known());
    }

    #[test]
    fn test_unknown_is_not_null() {
        let unknown = WireValue::unknown(WireType::String);
        assert!(!unknown.is_null());
        assert!(!unknown.is_known());
        assert_ne!(unknown, WireValue::null(WireType::String));
    }

    #[test]
    fn test_fully_known_checks_children() {
        let list = WireValue::list(
            WireType::String,
            vec![WireValue::string("a"), WireValue::unknown(WireType::String)],
        )
        .unwrap();
        assert!(list.is_known());
        assert!(!list.is_fully_known());
    }

    #[test]
    fn test_usable_as() {
        let list_str = WireType::List(Box::new(WireType::String));
        let list_dyn = WireType::List(Box::new(WireType::DynamicPseudoType));
        assert!(list_str.usable_as(&list_dyn));
        assert!(!list_dyn.usable_as(&list_str));
        assert!(list_str.usable_as(&WireType::DynamicPseudoType));
        assert!(!list_str.usable_as(&WireType::Set(Box::new(WireType::String))));
    }

    #[test]
    fn test_debug_form() {
        assert_eq!(format!("{:?}", WireValue::string("test")), "String<\"test\">");
        assert_eq!(
            format!("{:?}", WireValue::null(WireType::String)),
            "String<null>"
        );
    }
}
