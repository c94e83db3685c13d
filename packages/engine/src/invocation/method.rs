// packages/engine/src/invocation/method.rs
//! Method descriptors
//!
//! A surrogate describes each of its methods once with a static
//! [`MethodSignature`]. Invocation records carry a [`MethodDescriptor`]
//! built from it in one of two forms:
//!
//! - **Delegating**: borrows the static signature directly. Cheapest, but
//!   only meaningful inside the process that produced it.
//! - **Serializable**: owns the declaring type, name and parameter type
//!   names, and re-resolves the static signature through the
//!   [`MethodRegistry`] after crossing a process or serialization boundary.
//!
//! Which form a mock uses is fixed when its dispatcher is built.

use crate::creation::settings::MockSettings;
use crate::invocation::method_registry::MethodRegistry;
use crate::invocation::value::{Value, ValueKind};
use crate::utils::errors::{EngineError, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Real-implementation entry point for a method
///
/// Receives the object holding the real implementation and the raw
/// arguments; downcasting the receiver is the surrogate's business.
pub type RealDispatch = fn(&(dyn Any + Send + Sync), &[Value]) -> anyhow::Result<Value>;

/// Static description of one overridable method
#[derive(Debug)]
pub struct MethodSignature {
    declaring_type: &'static str,
    name: &'static str,
    parameter_types: &'static [&'static str],
    return_kind: ValueKind,
    var_args: bool,
    dispatch: Option<RealDispatch>,
}

impl MethodSignature {
    /// Describe an abstract method (no real implementation)
    pub const fn new(
        declaring_type: &'static str,
        name: &'static str,
        parameter_types: &'static [&'static str],
        return_kind: ValueKind,
    ) -> Self {
        Self {
            declaring_type,
            name,
            parameter_types,
            return_kind,
            var_args: false,
            dispatch: None,
        }
    }

    /// Attach the real implementation, making the method concrete
    pub const fn with_dispatch(self, dispatch: RealDispatch) -> Self {
        Self {
            declaring_type: self.declaring_type,
            name: self.name,
            parameter_types: self.parameter_types,
            return_kind: self.return_kind,
            var_args: self.var_args,
            dispatch: Some(dispatch),
        }
    }

    /// Mark the last parameter as variadic
    pub const fn var_args(self) -> Self {
        Self {
            declaring_type: self.declaring_type,
            name: self.name,
            parameter_types: self.parameter_types,
            return_kind: self.return_kind,
            var_args: true,
            dispatch: self.dispatch,
        }
    }

    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parameter_types(&self) -> &'static [&'static str] {
        self.parameter_types
    }

    pub fn return_kind(&self) -> ValueKind {
        self.return_kind
    }

    pub fn is_var_args(&self) -> bool {
        self.var_args
    }

    pub fn is_abstract(&self) -> bool {
        self.dispatch.is_none()
    }

    pub fn dispatch(&self) -> Option<RealDispatch> {
        self.dispatch
    }

    pub fn key(&self) -> MethodKey {
        MethodKey {
            declaring_type: self.declaring_type.to_string(),
            name: self.name.to_string(),
            parameter_types: self.parameter_types.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Owned method identity: declaring type, name and parameter type names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodKey {
    pub declaring_type: String,
    pub name: String,
    pub parameter_types: Vec<String>,
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.declaring_type,
            self.name,
            self.parameter_types.join(", ")
        )
    }
}

/// Uniform view over both descriptor forms
pub trait MockMethod {
    fn declaring_type(&self) -> &str;

    fn name(&self) -> &str;

    fn parameter_types(&self) -> Vec<&str>;

    fn parameter_count(&self) -> usize;

    fn parameter_type(&self, index: usize) -> Option<&str>;

    fn return_kind(&self) -> ValueKind;

    fn is_var_args(&self) -> bool;

    fn is_abstract(&self) -> bool;

    /// Run the real implementation against `receiver`
    fn invoke(&self, receiver: &(dyn Any + Send + Sync), args: &[Value]) -> anyhow::Result<Value>;
}

fn invoke_signature(
    signature: &MethodSignature,
    receiver: &(dyn Any + Send + Sync),
    args: &[Value],
) -> anyhow::Result<Value> {
    match signature.dispatch {
        Some(dispatch) => dispatch(receiver, args),
        None => Err(EngineError::AbstractRealCall(signature.key().to_string()).into()),
    }
}

/// In-process descriptor borrowing the static signature
#[derive(Debug, Clone, Copy)]
pub struct DelegatingMethod {
    signature: &'static MethodSignature,
}

impl DelegatingMethod {
    pub fn new(signature: &'static MethodSignature) -> Self {
        Self { signature }
    }

    pub fn signature(&self) -> &'static MethodSignature {
        self.signature
    }
}

impl MockMethod for DelegatingMethod {
    fn declaring_type(&self) -> &str {
        self.signature.declaring_type
    }

    fn name(&self) -> &str {
        self.signature.name
    }

    fn parameter_types(&self) -> Vec<&str> {
        self.signature.parameter_types.to_vec()
    }

    fn parameter_count(&self) -> usize {
        self.signature.parameter_types.len()
    }

    fn parameter_type(&self, index: usize) -> Option<&str> {
        self.signature.parameter_types.get(index).copied()
    }

    fn return_kind(&self) -> ValueKind {
        self.signature.return_kind
    }

    fn is_var_args(&self) -> bool {
        self.signature.var_args
    }

    fn is_abstract(&self) -> bool {
        self.signature.is_abstract()
    }

    fn invoke(&self, receiver: &(dyn Any + Send + Sync), args: &[Value]) -> anyhow::Result<Value> {
        invoke_signature(self.signature, receiver, args)
    }
}

/// Transportable descriptor, re-resolved by name on the receiving side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableMethod {
    declaring_type: String,
    name: String,
    parameter_types: Vec<String>,
    return_kind: ValueKind,
    var_args: bool,
    is_abstract: bool,
    #[serde(skip)]
    resolved: OnceCell<&'static MethodSignature>,
}

impl SerializableMethod {
    pub fn new(signature: &'static MethodSignature) -> Self {
        Self {
            declaring_type: signature.declaring_type.to_string(),
            name: signature.name.to_string(),
            parameter_types: signature.parameter_types.iter().map(|t| t.to_string()).collect(),
            return_kind: signature.return_kind,
            var_args: signature.var_args,
            is_abstract: signature.is_abstract(),
            resolved: OnceCell::with_value(signature),
        }
    }

    pub fn key(&self) -> MethodKey {
        MethodKey {
            declaring_type: self.declaring_type.clone(),
            name: self.name.clone(),
            parameter_types: self.parameter_types.clone(),
        }
    }

    /// Find the static signature this descriptor names
    pub fn resolve(&self) -> Result<&'static MethodSignature> {
        self.resolved
            .get_or_try_init(|| {
                MethodRegistry::global().lookup(&self.key()).ok_or_else(|| {
                    EngineError::MethodResolution(format!(
                        "{} is not registered in this process",
                        self.key()
                    ))
                })
            })
            .copied()
    }
}

impl MockMethod for SerializableMethod {
    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_types(&self) -> Vec<&str> {
        self.parameter_types.iter().map(String::as_str).collect()
    }

    fn parameter_count(&self) -> usize {
        self.parameter_types.len()
    }

    fn parameter_type(&self, index: usize) -> Option<&str> {
        self.parameter_types.get(index).map(String::as_str)
    }

    fn return_kind(&self) -> ValueKind {
        self.return_kind
    }

    fn is_var_args(&self) -> bool {
        self.var_args
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn invoke(&self, receiver: &(dyn Any + Send + Sync), args: &[Value]) -> anyhow::Result<Value> {
        if self.is_abstract {
            return Err(EngineError::AbstractRealCall(self.key().to_string()).into());
        }
        let signature = self.resolve()?;
        invoke_signature(signature, receiver, args)
    }
}

/// Method identity attached to an invocation record
#[derive(Debug, Clone)]
pub enum MethodDescriptor {
    Delegating(DelegatingMethod),
    Serializable(SerializableMethod),
}

impl MethodDescriptor {
    fn as_method(&self) -> &dyn MockMethod {
        match self {
            MethodDescriptor::Delegating(m) => m,
            MethodDescriptor::Serializable(m) => m,
        }
    }

    pub fn is_serializable(&self) -> bool {
        matches!(self, MethodDescriptor::Serializable(_))
    }

    pub fn key(&self) -> MethodKey {
        match self {
            MethodDescriptor::Delegating(m) => m.signature.key(),
            MethodDescriptor::Serializable(m) => m.key(),
        }
    }
}

impl MockMethod for MethodDescriptor {
    fn declaring_type(&self) -> &str {
        self.as_method().declaring_type()
    }

    fn name(&self) -> &str {
        self.as_method().name()
    }

    fn parameter_types(&self) -> Vec<&str> {
        self.as_method().parameter_types()
    }

    fn parameter_count(&self) -> usize {
        self.as_method().parameter_count()
    }

    fn parameter_type(&self, index: usize) -> Option<&str> {
        self.as_method().parameter_type(index)
    }

    fn return_kind(&self) -> ValueKind {
        self.as_method().return_kind()
    }

    fn is_var_args(&self) -> bool {
        self.as_method().is_var_args()
    }

    fn is_abstract(&self) -> bool {
        self.as_method().is_abstract()
    }

    fn invoke(&self, receiver: &(dyn Any + Send + Sync), args: &[Value]) -> anyhow::Result<Value> {
        self.as_method().invoke(receiver, args)
    }
}

// Both forms of the same method compare equal.
impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type() == other.declaring_type()
            && self.name() == other.name()
            && self.parameter_count() == other.parameter_count()
            && (0..self.parameter_count()).all(|i| self.parameter_type(i) == other.parameter_type(i))
    }
}

impl Eq for MethodDescriptor {}

impl Hash for MethodDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.declaring_type().hash(state);
        self.name().hash(state);
        let count = self.parameter_count();
        count.hash(state);
        for ty in (0..count).filter_map(|i| self.parameter_type(i)) {
            ty.hash(state);
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.declaring_type(),
            self.name(),
            self.parameter_types().join(", ")
        )
    }
}

/// Descriptor form chosen for a mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodStrategy {
    Delegating,
    Serializable,
}

impl MethodStrategy {
    pub fn for_settings(settings: &MockSettings) -> Self {
        if settings.is_serializable() {
            MethodStrategy::Serializable
        } else {
            MethodStrategy::Delegating
        }
    }

    pub fn describe(self, signature: &'static MethodSignature) -> MethodDescriptor {
        match self {
            MethodStrategy::Delegating => MethodDescriptor::Delegating(DelegatingMethod::new(signature)),
            MethodStrategy::Serializable => {
                MethodDescriptor::Serializable(SerializableMethod::new(signature))
            }
        }
    }
}
