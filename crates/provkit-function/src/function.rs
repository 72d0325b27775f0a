//! The provider function trait and the call path that drives it.

use provkit_core::{Value, WireValue};

use crate::arguments::ArgumentsData;
use crate::definition::FunctionDefinition;
use crate::error::FuncError;

/// A provider-defined function.
pub trait Function: Send + Sync {
    /// Name the function is called by.
    fn name(&self) -> &str;

    /// Signature and documentation.
    fn definition(&self) -> FunctionDefinition;

    /// Compute the result from decoded arguments.
    fn run(&self, arguments: &ArgumentsData) -> Result<Value, FuncError>;
}

/// Call `function` with wire arguments and return its wire result.
///
/// The definition is validated first. A null argument for a parameter that
/// does not allow nulls is an error on that argument. When any argument is
/// not fully known and its parameter does not accept unknown values, the
/// function is not run and the result is unknown.
pub fn call_function(function: &dyn Function, arguments: &[WireValue]) -> Result<WireValue, FuncError> {
    let definition = function.definition();
    let diags = definition.validate_implementation();
    if let Some(err) = FuncError::from_diagnostics(&diags) {
        return Err(err);
    }
    let Some(return_type) = definition.returns.as_ref().and_then(|r| r.get_type()) else {
        return Err(FuncError::new("Definition Return field is undefined"));
    };

    for (position, argument) in arguments.iter().enumerate() {
        // Surplus arguments are reported by the arity check while decoding.
        let Ok(parameter) = definition.parameter(position) else {
            break;
        };
        let name = parameter.effective_name(position, position >= definition.parameters.len());
        let position = i64::try_from(position).unwrap_or(i64::MAX);
        if argument.is_null() && !parameter.allow_null_value {
            return Err(FuncError::argument(
                position,
                format!("Invalid value for \"{name}\" parameter: argument must not be null."),
            ));
        }
        if !argument.is_fully_known() && !parameter.allow_unknown_values {
            tracing::debug!(function = function.name(), position, "unknown argument, skipping run");
            return Ok(WireValue::unknown(return_type.wire_type()));
        }
    }

    let data = ArgumentsData::from_wire(arguments, &definition).map_err(|diags| {
        FuncError::from_diagnostics(&diags)
            .unwrap_or_else(|| FuncError::new("Unable to decode function arguments"))
    })?;

    let mut result = function.run(&data)?;
    if return_type.is_dynamic() && !result.ty().is_dynamic() {
        result = Value::dynamic(result);
    }
    if result.ty() != &return_type {
        return Err(FuncError::new(format!(
            "Invalid Function Result: The function returned a value of type {} but the definition \
             declares {return_type}. This is always an issue in the provider code and should be \
             reported to the provider developers.",
            result.ty()
        )));
    }

    let wire = result.to_wire().map_err(|err| {
        FuncError::new(format!(
            "Invalid Function Result: The function result could not be serialized. This is always \
             an issue in the provider code and should be reported to the provider developers.\n\n\
             Error: {err}"
        ))
    })?;
    tracing::debug!(function = function.name(), arguments = arguments.len(), "called function");
    Ok(wire)
}
