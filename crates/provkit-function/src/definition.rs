//! # Function Definitions
//!
//! A [`FunctionDefinition`] lists the fixed parameters, an optional trailing
//! variadic parameter, and the return type. It is validated once with
//! [`FunctionDefinition::validate_implementation`] and afterwards only read,
//! mostly through positional [`FunctionDefinition::parameter`] lookups while
//! decoding call arguments.

use std::collections::HashMap;

use provkit_core::{Diagnostic, Diagnostics};

use crate::parameter::Parameter;
use crate::returns::Return;

const POSITION_PREFIX: &str = "When determining the parameter for the given argument position, \
    an invalid value was given. This is always an issue in the provider code and should be \
    reported to the provider developers.\n\n";

const DEFINITION_PREFIX: &str = "When validating the function definition, an implementation \
    issue was found. This is always an issue with the provider and should be reported to the \
    provider developers.\n\n";

const NESTED_DYNAMIC: &str = "contains a collection type with a nested dynamic type. Dynamic \
    types inside of collections are not currently supported in provkit.";

/// Signature and documentation of one provider-defined function.
#[derive(Debug, Clone, Default)]
pub struct FunctionDefinition {
    /// Fixed positional parameters.
    pub parameters: Vec<Parameter>,
    /// Parameter accepting zero or more trailing arguments.
    pub variadic_parameter: Option<Parameter>,
    /// Return type. Required.
    pub returns: Option<Return>,
    /// One-line summary.
    pub summary: String,
    /// Practitioner-facing description.
    pub description: String,
    /// Non-empty when the function is deprecated.
    pub deprecation_message: String,
}

impl FunctionDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_variadic_parameter(mut self, parameter: Parameter) -> Self {
        self.variadic_parameter = Some(parameter);
        self
    }

    pub fn with_return(mut self, returns: Return) -> Self {
        self.returns = Some(returns);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = message.into();
        self
    }

    /// The parameter for argument `position`.
    ///
    /// Positions past the fixed parameters map to the variadic parameter,
    /// when there is one.
    pub fn parameter(&self, position: usize) -> Result<&Parameter, Diagnostic> {
        if let Some(parameter) = self.parameters.get(position) {
            return Ok(parameter);
        }
        if let Some(variadic) = &self.variadic_parameter {
            return Ok(variadic);
        }
        let detail = match self.parameters.len() {
            0 => format!("Function does not implement parameters.\nGiven position: {position}"),
            len => format!("Max argument position: {}\nGiven position: {position}", len - 1),
        };
        Err(Diagnostic::error(
            "Invalid Parameter Position for Definition",
            format!("{POSITION_PREFIX}{detail}"),
        ))
    }

    /// Check the definition for implementation mistakes.
    ///
    /// Parameters are scanned left to right with the variadic parameter
    /// last, at position `parameters.len()`. Each later parameter sharing a
    /// name with an earlier one is reported against the first occurrence.
    pub fn validate_implementation(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();

        match self.returns.as_ref().and_then(Return::get_type) {
            None => diags.add_error(
                "Invalid Function Definition",
                format!("{DEFINITION_PREFIX}Definition Return field is undefined"),
            ),
            Some(ty) if ty.contains_collection_with_dynamic() => diags.add_error(
                "Invalid Function Definition",
                format!("{DEFINITION_PREFIX}Return {NESTED_DYNAMIC}"),
            ),
            Some(_) => {}
        }

        let mut first_position: HashMap<String, usize> = HashMap::new();
        for (position, parameter) in self.parameters.iter().enumerate() {
            check_nested_dynamic(parameter, position, &mut diags);
            let name = parameter.effective_name(position, false);
            match first_position.get(&name) {
                Some(&first) => diags.add_error(
                    "Invalid Function Definition",
                    format!(
                        "{DEFINITION_PREFIX}Parameter names must be unique. Parameters at \
                         position {first} and {position} have the same name \"{name}\""
                    ),
                ),
                None => {
                    first_position.insert(name, position);
                }
            }
        }

        if let Some(variadic) = &self.variadic_parameter {
            let position = self.parameters.len();
            check_nested_dynamic(variadic, position, &mut diags);
            let name = variadic.effective_name(position, true);
            if let Some(&first) = first_position.get(&name) {
                diags.add_error(
                    "Invalid Function Definition",
                    format!(
                        "{DEFINITION_PREFIX}Parameter names must be unique. Parameter at \
                         position {first} and the variadic parameter have the same name \
                         \"{name}\""
                    ),
                );
            }
        }

        tracing::debug!(
            parameters = self.parameters.len(),
            variadic = self.variadic_parameter.is_some(),
            diagnostics = diags.len(),
            "validated function definition"
        );
        diags
    }
}

fn check_nested_dynamic(parameter: &Parameter, position: usize, diags: &mut Diagnostics) {
    if parameter
        .get_type()
        .is_some_and(|ty| ty.contains_collection_with_dynamic())
    {
        diags.add_error(
            "Invalid Function Definition",
            format!("{DEFINITION_PREFIX}Parameter at position {position} {NESTED_DYNAMIC}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provkit_core::Type;

    fn details(diags: &Diagnostics) -> Vec<String> {
        diags
            .iter()
            .map(|d| d.detail.trim_start_matches(DEFINITION_PREFIX).to_string())
            .collect()
    }

    fn named(names: &[&str]) -> FunctionDefinition {
        names
            .iter()
            .fold(FunctionDefinition::new().with_return(Return::string()), |def, name| {
                def.with_parameter(Parameter::string().named(*name))
            })
    }

    #[test]
    fn test_parameter_lookup() {
        let def = FunctionDefinition::new()
            .with_parameter(Parameter::bool())
            .with_parameter(Parameter::number())
            .with_parameter(Parameter::string());
        assert_eq!(def.parameter(0).unwrap().get_type(), Some(Type::Bool));
        assert_eq!(def.parameter(2).unwrap().get_type(), Some(Type::String));

        let diag = def.parameter(3).unwrap_err();
        assert_eq!(diag.summary, "Invalid Parameter Position for Definition");
        assert_eq!(
            diag.detail,
            format!("{POSITION_PREFIX}Max argument position: 2\nGiven position: 3")
        );
    }

    #[test]
    fn test_variadic_takes_remaining_positions() {
        let def = FunctionDefinition::new()
            .with_parameter(Parameter::bool())
            .with_variadic_parameter(Parameter::string());
        assert_eq!(def.parameter(0).unwrap().get_type(), Some(Type::Bool));
        assert_eq!(def.parameter(1).unwrap().get_type(), Some(Type::String));
        assert_eq!(def.parameter(50).unwrap().get_type(), Some(Type::String));

        let only = FunctionDefinition::new().with_variadic_parameter(Parameter::number());
        assert_eq!(only.parameter(0).unwrap().get_type(), Some(Type::Number));
    }

    #[test]
    fn test_no_parameters_rejects_every_position() {
        let def = FunctionDefinition::new().with_return(Return::string());
        for position in [0, 1, 7] {
            let diag = def.parameter(position).unwrap_err();
            assert_eq!(
                diag.detail,
                format!(
                    "{POSITION_PREFIX}Function does not implement parameters.\nGiven position: {position}"
                )
            );
        }
    }

    #[test]
    fn test_valid_definitions() {
        let cases = [
            FunctionDefinition::new().with_return(Return::string()),
            FunctionDefinition::new()
                .with_variadic_parameter(Parameter::string())
                .with_return(Return::string()),
            FunctionDefinition::new()
                .with_parameter(Parameter::string())
                .with_parameter(Parameter::string())
                .with_return(Return::string()),
            FunctionDefinition::new()
                .with_parameter(Parameter::string())
                .with_variadic_parameter(Parameter::number())
                .with_return(Return::string()),
        ];
        for def in cases {
            assert!(def.validate_implementation().is_empty(), "{def:?}");
        }
    }

    #[test]
    fn test_return_missing() {
        let diags = FunctionDefinition::new().validate_implementation();
        assert_eq!(details(&diags), ["Definition Return field is undefined"]);
        assert_eq!(diags.iter().next().unwrap().summary, "Invalid Function Definition");

        let incomplete = FunctionDefinition::new()
            .with_return(Return::new(provkit_core::DeclaredType::List { element_type: None }));
        assert_eq!(
            details(&incomplete.validate_implementation()),
            ["Definition Return field is undefined"]
        );
    }

    #[test]
    fn test_nested_dynamic_parameters() {
        let def = FunctionDefinition::new()
            .with_parameter(Parameter::list(Type::Dynamic))
            .with_return(Return::string());
        assert_eq!(
            details(&def.validate_implementation()),
            [format!("Parameter at position 0 {NESTED_DYNAMIC}")]
        );

        let variadic = FunctionDefinition::new()
            .with_parameter(Parameter::string())
            .with_parameter(Parameter::string())
            .with_variadic_parameter(Parameter::set(Type::Dynamic))
            .with_return(Return::string());
        assert_eq!(
            details(&variadic.validate_implementation()),
            [format!("Parameter at position 2 {NESTED_DYNAMIC}")]
        );
    }

    #[test]
    fn test_nested_dynamic_return() {
        let def = FunctionDefinition::new().with_return(Return::set(Type::Dynamic));
        assert_eq!(
            details(&def.validate_implementation()),
            [format!("Return {NESTED_DYNAMIC}")]
        );
        let plain = FunctionDefinition::new().with_return(Return::dynamic());
        assert!(plain.validate_implementation().is_empty());
    }

    #[test]
    fn test_single_collision() {
        let diags = named(&["a", "b", "a"]).validate_implementation();
        assert_eq!(
            details(&diags),
            ["Parameter names must be unique. Parameters at position 0 and 2 have the same name \"a\""]
        );
    }

    #[test]
    fn test_collisions_against_first_occurrence() {
        let diags = named(&["a", "b", "a", "c", "a"]).validate_implementation();
        assert_eq!(
            details(&diags),
            [
                "Parameter names must be unique. Parameters at position 0 and 2 have the same name \"a\"",
                "Parameter names must be unique. Parameters at position 0 and 4 have the same name \"a\"",
            ]
        );
    }

    #[test]
    fn test_collision_with_default_name() {
        let def = FunctionDefinition::new()
            .with_parameter(Parameter::string().named("param2"))
            .with_parameter(Parameter::number())
            .with_return(Return::string());
        assert_eq!(
            details(&def.validate_implementation()),
            ["Parameter names must be unique. Parameters at position 0 and 1 have the same name \"param2\""]
        );
    }

    #[test]
    fn test_collision_with_variadic() {
        let def = named(&["param-dup", "float-param", "param-dup", "number-param", "param-dup"])
            .with_variadic_parameter(Parameter::bool().named("param-dup"));
        assert_eq!(
            details(&def.validate_implementation()),
            [
                "Parameter names must be unique. Parameters at position 0 and 2 have the same name \"param-dup\"",
                "Parameter names must be unique. Parameters at position 0 and 4 have the same name \"param-dup\"",
                "Parameter names must be unique. Parameter at position 0 and the variadic parameter have the same name \"param-dup\"",
            ]
        );

        let defaulted = FunctionDefinition::new()
            .with_parameter(Parameter::number().named("varparam"))
            .with_variadic_parameter(Parameter::bool())
            .with_return(Return::string());
        assert_eq!(
            details(&defaulted.validate_implementation()),
            ["Parameter names must be unique. Parameter at position 0 and the variadic parameter have the same name \"varparam\""]
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let def = named(&["a", "a"]).with_parameter(Parameter::map(Type::Dynamic));
        assert_eq!(def.validate_implementation(), def.validate_implementation());
    }
}
