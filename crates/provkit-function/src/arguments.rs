//! # Argument Data
//!
//! [`ArgumentsData`] is the decoded form of a call's wire arguments: one
//! framework value per fixed parameter and, when the definition has a
//! variadic parameter, one trailing list value holding every extra
//! argument in order.

use provkit_core::{convert, Diagnostics, Path, Type, Value, WireValue};

use crate::definition::FunctionDefinition;
use crate::error::FuncError;

const CONVERT_ARGUMENT_PREFIX: &str = "An unexpected error was encountered when converting the \
    function argument from the wire form. This is always an issue in provkit used to implement \
    the provider and should be reported to the provider developers.\n\nPlease report this to \
    the provider developer:\n\n";

const USAGE_PREFIX: &str = "When attempting to fetch argument data during the function call, the \
    provider code incorrectly attempted to read argument data. ";

/// Decoded arguments of one function call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentsData {
    values: Vec<Value>,
}

impl ArgumentsData {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Decode wire arguments against `definition`.
    ///
    /// Arity is checked first. Each argument is then decoded with the type
    /// of the parameter at its position and validated by that type. Errors
    /// at one position do not stop later positions from being checked.
    pub fn from_wire(
        arguments: &[WireValue],
        definition: &FunctionDefinition,
    ) -> Result<Self, Diagnostics> {
        let fixed = definition.parameters.len();
        let variadic = definition.variadic_parameter.as_ref();

        if variadic.is_none() && arguments.len() != fixed {
            return Err(unexpected_arguments(format!(
                "Expected function arguments: {fixed}\nGiven function arguments: {}",
                arguments.len()
            )));
        }
        if arguments.len() < fixed {
            return Err(unexpected_arguments(format!(
                "Expected minimum function arguments: {fixed}\nGiven function arguments: {}",
                arguments.len()
            )));
        }
        if variadic.is_none() && arguments.is_empty() {
            return Ok(Self::default());
        }

        let mut diags = Diagnostics::new();
        let mut values = Vec::with_capacity(fixed + 1);
        let mut variadic_values = Vec::with_capacity(arguments.len() - fixed);

        for (position, argument) in arguments.iter().enumerate() {
            let parameter = definition.parameter(position).map_err(Diagnostics::from)?;
            let Some(ty) = parameter.get_type() else {
                diags.add_error(
                    "Unable to Convert Function Argument",
                    format!("{CONVERT_ARGUMENT_PREFIX}Parameter type missing at position {position}"),
                );
                return Err(diags);
            };

            let expected = ty.wire_type();
            if !argument.ty().usable_as(&expected) {
                diags.add_error(
                    "Unable to Convert Function Argument",
                    format!(
                        "{CONVERT_ARGUMENT_PREFIX}Unable to read wire value at position \
                         {position}: expected {expected}, got {}",
                        argument.ty()
                    ),
                );
                return Err(diags);
            }

            let value = match ty.value_from_wire(argument) {
                Ok(value) => value,
                Err(err) => {
                    diags.add_error(
                        "Unable to Convert Function Argument",
                        format!(
                            "{CONVERT_ARGUMENT_PREFIX}Unable to convert wire value to framework \
                             type at position {position}: {err}"
                        ),
                    );
                    return Err(diags);
                }
            };

            if matches!(ty, Type::Custom(_)) {
                diags.append(ty.validate(argument, &Path::empty()));
                if diags.has_error() {
                    continue;
                }
            }

            if variadic.is_some() && position >= fixed {
                variadic_values.push(value);
            } else {
                values.push(value);
            }
        }

        if diags.has_error() {
            return Err(diags);
        }

        if let Some(ty) = variadic.and_then(|param| param.get_type()) {
            match Value::list(ty, variadic_values) {
                Ok(list) => values.push(list),
                Err(err) => {
                    diags.add_error(
                        "Unable to Convert Function Argument",
                        format!("{CONVERT_ARGUMENT_PREFIX}Unable to collect variadic arguments: {err}"),
                    );
                    return Err(diags);
                }
            }
        }

        for warning in diags.warnings() {
            tracing::warn!(summary = %warning.summary, detail = %warning.detail, "argument warning");
        }
        tracing::trace!(arguments = arguments.len(), values = values.len(), "decoded function arguments");
        Ok(Self { values })
    }

    /// Every argument value; the number of values must equal `expected`.
    ///
    /// A variadic parameter counts as one value.
    pub fn get(&self, expected: usize) -> Result<&[Value], FuncError> {
        if self.values.is_empty() {
            return Err(usage_error(
                "This is always an issue in the provider code and should be reported to the \
                 provider developers.\n\nFunction does not have argument data.",
            ));
        }
        if expected != self.values.len() {
            return Err(usage_error(&format!(
                "The Get call requires all parameters and the final variadic parameter, if \
                 implemented, to be in the targets. This is always an error in the provider code \
                 and should be reported to the provider developers.\n\nGiven targets count: \
                 {expected}, expected targets count: {}",
                self.values.len()
            )));
        }
        Ok(&self.values)
    }

    /// The argument at `position`.
    pub fn get_argument(&self, position: usize) -> Result<&Value, FuncError> {
        if self.values.is_empty() {
            return Err(usage_error(
                "This is always an issue in the provider code and should be reported to the \
                 provider developers.\n\nFunction does not have argument data.",
            ));
        }
        self.values.get(position).ok_or_else(|| {
            FuncError::new(format!(
                "Invalid Argument Data Position: When attempting to fetch argument data during the \
                 function call, the provider code attempted to read a non-existent argument \
                 position. Function argument positions are 0-based and any final variadic \
                 parameter is represented as one argument position with an ordered list of the \
                 parameter data type. This is always an error in the provider code and should be \
                 reported to the provider developers.\n\nGiven argument position: {position}, \
                 last argument position: {}",
                self.values.len() - 1
            ))
        })
    }

    /// The argument at `position`, converted to `target`.
    pub fn get_argument_as(&self, position: usize, target: &Type) -> Result<Value, FuncError> {
        let value = self.get_argument(position)?;
        convert(value, target).map_err(|err| {
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            FuncError::argument(
                position,
                format!(
                    "Argument Value Conversion Error: An unexpected error was encountered \
                     converting the argument to {target}. This is always an error in the provider \
                     code and should be reported to the provider developers.\n\nError: {err}"
                ),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn unexpected_arguments(counts: String) -> Diagnostics {
    provkit_core::Diagnostic::error(
        "Unexpected Function Arguments Data",
        format!(
            "The provider received an unexpected number of function arguments from the \
             orchestrator for the given function definition. This is always an issue in provkit \
             or the orchestrator itself and should be reported to the provider developers.\n\n\
             {counts}"
        ),
    )
    .into()
}

fn usage_error(detail: &str) -> FuncError {
    FuncError::new(format!("Invalid Argument Data Usage: {USAGE_PREFIX}{detail}"))
}
