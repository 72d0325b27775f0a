//! Function parameters and their default names.

use provkit_core::{DeclaredType, Type};

/// Prefix of the name given to an unnamed fixed parameter.
pub const DEFAULT_PARAMETER_NAME_PREFIX: &str = "param";

/// Name given to an unnamed variadic parameter.
pub const DEFAULT_VARIADIC_PARAMETER_NAME: &str = "varparam";

/// The name a parameter gets when its definition leaves it empty.
///
/// Fixed parameters are numbered from one: the parameter at position 0 is
/// `param1`. The variadic parameter is always `varparam`.
pub fn default_parameter_name(position: usize, is_variadic: bool) -> String {
    if is_variadic {
        DEFAULT_VARIADIC_PARAMETER_NAME.to_string()
    } else {
        format!("{DEFAULT_PARAMETER_NAME_PREFIX}{}", position + 1)
    }
}

/// One positional parameter of a function.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Declared argument type.
    pub declared: DeclaredType,
    /// Parameter name; empty means the default name applies.
    pub name: String,
    /// Practitioner-facing description.
    pub description: String,
    /// Accept null arguments.
    pub allow_null_value: bool,
    /// Accept arguments that are not yet known.
    pub allow_unknown_values: bool,
    /// Provider-defined type replacing the declared one.
    pub custom_type: Option<Type>,
}

impl Parameter {
    pub fn new(declared: DeclaredType) -> Self {
        Self {
            declared,
            name: String::new(),
            description: String::new(),
            allow_null_value: false,
            allow_unknown_values: false,
            custom_type: None,
        }
    }

    pub fn string() -> Self {
        Self::new(DeclaredType::String)
    }

    pub fn bool() -> Self {
        Self::new(DeclaredType::Bool)
    }

    pub fn number() -> Self {
        Self::new(DeclaredType::Number)
    }

    pub fn dynamic() -> Self {
        Self::new(DeclaredType::Dynamic)
    }

    pub fn list(element: Type) -> Self {
        Self::new(DeclaredType::list(element))
    }

    pub fn set(element: Type) -> Self {
        Self::new(DeclaredType::set(element))
    }

    pub fn map(element: Type) -> Self {
        Self::new(DeclaredType::map(element))
    }

    pub fn object<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        Self::new(DeclaredType::object(attributes))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn allow_null_value(mut self) -> Self {
        self.allow_null_value = true;
        self
    }

    pub fn allow_unknown_values(mut self) -> Self {
        self.allow_unknown_values = true;
        self
    }

    pub fn with_custom_type(mut self, ty: Type) -> Self {
        self.custom_type = Some(ty);
        self
    }

    /// The custom type if set, otherwise the declared type.
    pub fn get_type(&self) -> Option<Type> {
        self.custom_type.clone().or_else(|| self.declared.to_type())
    }

    /// The explicit name, or the default name for this position.
    pub fn effective_name(&self, position: usize, is_variadic: bool) -> String {
        if self.name.is_empty() {
            default_parameter_name(position, is_variadic)
        } else {
            self.name.clone()
        }
    }
}
