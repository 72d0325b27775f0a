//! Function return definitions.

use provkit_core::{DeclaredType, Type};

/// The type a function returns.
#[derive(Debug, Clone)]
pub struct Return {
    /// Declared return type.
    pub declared: DeclaredType,
    /// Provider-defined type replacing the declared one.
    pub custom_type: Option<Type>,
}

impl Return {
    pub fn new(declared: DeclaredType) -> Self {
        Self {
            declared,
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

    pub fn with_custom_type(mut self, ty: Type) -> Self {
        self.custom_type = Some(ty);
        self
    }

    /// The custom type if set, otherwise the declared type.
    pub fn get_type(&self) -> Option<Type> {
        self.custom_type.clone().or_else(|| self.declared.to_type())
    }
}
