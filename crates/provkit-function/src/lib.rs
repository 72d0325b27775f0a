//! # provkit-function — Provider-Defined Functions
//!
//! Definitions, validation, and the call path for functions a provider
//! exposes to configurations.
//!
//! ## Definitions
//!
//! A [`FunctionDefinition`] lists fixed [`Parameter`]s, an optional variadic
//! parameter, and a [`Return`]. Unnamed parameters get default names
//! (`param1`, `param2`, ..., `varparam`) when names are compared or shown.
//!
//! ## Calling
//!
//! [`call_function`] validates the definition, decodes wire arguments into
//! [`ArgumentsData`], runs the [`Function`], and checks and serializes the
//! result. Every failure along the way is a [`FuncError`].
//!
//! ## Crate Policy
//!
//! - Depends only on `provkit-core` internally.
//! - Definitions are validated per call and never mutated.

pub mod arguments;
pub mod definition;
pub mod error;
pub mod function;
pub mod parameter;
pub mod returns;

pub use arguments::ArgumentsData;
pub use definition::FunctionDefinition;
pub use error::{FuncError, FunctionErrors};
pub use function::{call_function, Function};
pub use parameter::{
    default_parameter_name, Parameter, DEFAULT_PARAMETER_NAME_PREFIX, DEFAULT_VARIADIC_PARAMETER_NAME,
};
pub use returns::Return;
