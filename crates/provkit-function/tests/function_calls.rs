//! Integration test: define and call functions end to end.
//!
//! Covers variadic decoding, custom parameter types, unknown and null
//! handling, and error aggregation across a whole definition.

use std::collections::BTreeMap;

use proptest::prelude::*;
use provkit_core::{CustomType, Diagnostics, Path, Type, Value, WireData, WireType, WireValue};
use provkit_function::{
    call_function, ArgumentsData, FuncError, Function, FunctionDefinition, Parameter, Return,
};

#[derive(Debug)]
struct Lowercase;

impl CustomType for Lowercase {
    fn name(&self) -> &str {
        "Lowercase"
    }

    fn base_type(&self) -> Type {
        Type::String
    }

    fn validate(&self, value: &WireValue, path: &Path) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let WireData::String(s) = value.data() {
            if s.chars().any(char::is_uppercase) {
                diags.add_attribute_error(
                    path.clone(),
                    "Invalid Lowercase String",
                    format!("{s:?} has uppercase letters"),
                );
            }
        }
        diags
    }
}

struct Join;

impl Function for Join {
    fn name(&self) -> &str {
        "join"
    }

    fn definition(&self) -> FunctionDefinition {
        FunctionDefinition::new()
            .with_summary("Join strings")
            .with_parameter(Parameter::string().named("separator"))
            .with_variadic_parameter(Parameter::string().named("parts").allow_unknown_values())
            .with_return(Return::string())
    }

    fn run(&self, arguments: &ArgumentsData) -> Result<Value, FuncError> {
        let [separator, parts] = arguments.get(2)? else {
            return Err(FuncError::new("join expects two argument positions"));
        };
        let separator = separator.as_str().unwrap_or_default();
        let parts = parts.elements().unwrap_or_default();
        if parts.iter().any(Value::is_unknown) {
            return Ok(Value::unknown(Type::String));
        }
        let joined: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
        Ok(Value::string(joined.join(separator)))
    }
}

struct Tag;

impl Function for Tag {
    fn name(&self) -> &str {
        "tag"
    }

    fn definition(&self) -> FunctionDefinition {
        FunctionDefinition::new()
            .with_parameter(Parameter::string().with_custom_type(Type::custom(Lowercase)))
            .with_return(Return::map(Type::String))
    }

    fn run(&self, arguments: &ArgumentsData) -> Result<Value, FuncError> {
        let key = arguments.get_argument_as(0, &Type::String)?;
        let entries = BTreeMap::from([(
            key.as_str().unwrap_or_default().to_string(),
            Value::string("true"),
        )]);
        Value::map(Type::String, entries).map_err(|err| FuncError::new(err.to_string()))
    }
}

#[test]
fn test_variadic_join() {
    let result = call_function(
        &Join,
        &[
            WireValue::string("-"),
            WireValue::string("a"),
            WireValue::string("b"),
            WireValue::string("c"),
        ],
    )
    .unwrap();
    assert_eq!(result, WireValue::string("a-b-c"));

    let empty = call_function(&Join, &[WireValue::string("-")]).unwrap();
    assert_eq!(empty, WireValue::string(""));
}

#[test]
fn test_unknown_variadic_reaches_function() {
    let result = call_function(
        &Join,
        &[WireValue::string("-"), WireValue::unknown(WireType::String)],
    )
    .unwrap();
    assert!(!result.is_known());
}

#[test]
fn test_unknown_fixed_argument_skips_run() {
    let result = call_function(
        &Join,
        &[WireValue::unknown(WireType::String), WireValue::string("a")],
    )
    .unwrap();
    assert_eq!(result, WireValue::unknown(WireType::String));
}

#[test]
fn test_custom_parameter_type_validates() {
    let ok = call_function(&Tag, &[WireValue::string("env")]).unwrap();
    assert_eq!(ok.ty(), &WireType::Map(Box::new(WireType::String)));

    let err = call_function(&Tag, &[WireValue::string("Env")]).unwrap_err();
    assert!(err.text.starts_with("Invalid Lowercase String: "), "{err}");
}

#[test]
fn test_definition_collisions_in_order() {
    let def = ["a", "b", "a", "c", "a"]
        .into_iter()
        .fold(FunctionDefinition::new().with_return(Return::bool()), |def, name| {
            def.with_parameter(Parameter::string().named(name))
        });
    let diags = def.validate_implementation();
    assert_eq!(diags.len(), 2);
    let mut details = diags.iter().map(|d| d.detail.as_str());
    assert!(details.next().unwrap().ends_with("Parameters at position 0 and 2 have the same name \"a\""));
    assert!(details.next().unwrap().ends_with("Parameters at position 0 and 4 have the same name \"a\""));
}

fn func_error() -> impl Strategy<Value = Option<FuncError>> {
    prop_oneof![
        Just(None),
        Just(Some(FuncError::default())),
        "[a-z]{1,8}".prop_map(|text| Some(FuncError::new(text))),
        ("[a-z]{0,8}", 0i64..5).prop_map(|(text, pos)| Some(FuncError::argument(pos, text))),
    ]
}

proptest! {
    #[test]
    fn test_concat_keeps_every_text(errors in proptest::collection::vec(func_error(), 0..8)) {
        let texts: Vec<String> = errors
            .iter()
            .flatten()
            .filter(|e| !e.text.is_empty())
            .map(|e| e.text.clone())
            .collect();
        let first_argument = errors.iter().flatten().find_map(|e| e.function_argument);
        match FuncError::concat(errors) {
            None => {
                prop_assert!(texts.is_empty());
                prop_assert!(first_argument.is_none());
            }
            Some(err) => {
                prop_assert_eq!(err.text, texts.join("\n"));
                prop_assert_eq!(err.function_argument, first_argument);
            }
        }
    }
}
