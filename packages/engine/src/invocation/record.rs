// packages/engine/src/invocation/record.rs
//! Invocation records
//!
//! One record is built for every intercepted call and handed to the mock's
//! handler. Records are immutable and every field is shared, so cloning one
//! to keep in a history is cheap.

use crate::creation::settings::MockSettings;
use crate::interception::mock::{Mock, MockId, WeakMock};
use crate::invocation::location::CallSiteLocator;
use crate::invocation::method::{MethodDescriptor, MockMethod};
use crate::invocation::value::Value;
use crate::utils::errors::EngineError;
use std::fmt;
use std::sync::Arc;

/// Closure running the real implementation of an intercepted method
pub type RealFn = dyn Fn() -> anyhow::Result<Value> + Send + Sync;

/// Ability to run the real implementation behind an invocation
///
/// Invoking is lazy and repeatable: every call to [`RealCall::invoke`] runs
/// the real implementation again, side effects included.
#[derive(Clone)]
pub enum RealCall {
    /// The method has no real implementation
    NotApplicable,
    CanInvoke(Arc<RealFn>),
}

impl RealCall {
    pub fn invokable<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        RealCall::CanInvoke(Arc::new(f))
    }

    pub fn is_invokable(&self) -> bool {
        matches!(self, RealCall::CanInvoke(_))
    }

    /// Run the real implementation, `None` when there is none
    pub fn invoke(&self) -> Option<anyhow::Result<Value>> {
        match self {
            RealCall::NotApplicable => None,
            RealCall::CanInvoke(f) => Some(f()),
        }
    }
}

impl fmt::Debug for RealCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RealCall::NotApplicable => write!(f, "NotApplicable"),
            RealCall::CanInvoke(_) => write!(f, "CanInvoke(..)"),
        }
    }
}

/// Immutable description of one intercepted call
#[derive(Clone)]
pub struct InvocationRecord {
    /// Non-owning; a retained record must not keep its mock alive
    mock: WeakMock,
    mock_id: MockId,
    mock_settings: Arc<MockSettings>,
    method: MethodDescriptor,
    arguments: Arc<[Value]>,
    real_call: RealCall,
    location: CallSiteLocator,
    sequence_number: u64,
}

impl InvocationRecord {
    pub fn new(
        mock: Mock,
        method: MethodDescriptor,
        arguments: Arc<[Value]>,
        real_call: RealCall,
        location: CallSiteLocator,
        sequence_number: u64,
    ) -> Self {
        debug_assert!(
            method.is_var_args() || arguments.len() == method.parameter_count(),
            "argument count does not match {}",
            method
        );

        Self {
            mock_id: mock.id(),
            mock_settings: Arc::clone(mock.settings()),
            mock: mock.downgrade(),
            method,
            arguments,
            real_call,
            location,
            sequence_number,
        }
    }

    /// The mock the call was made on, `None` once it has been dropped
    pub fn mock(&self) -> Option<Mock> {
        self.mock.upgrade()
    }

    pub fn mock_id(&self) -> MockId {
        self.mock_id
    }

    pub fn mock_settings(&self) -> &Arc<MockSettings> {
        &self.mock_settings
    }

    /// True iff the call was made on `mock`
    pub fn is_on(&self, mock: &Mock) -> bool {
        self.mock.refers_to(mock)
    }

    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    /// Arguments exactly as the surrogate passed them
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn shared_arguments(&self) -> Arc<[Value]> {
        Arc::clone(&self.arguments)
    }

    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    /// Arguments with a trailing var-args list flattened in place
    pub fn expanded_arguments(&self) -> Vec<Value> {
        if !self.method.is_var_args() {
            return self.arguments.to_vec();
        }

        match self.arguments.split_last() {
            Some((Value::List(rest), fixed)) => {
                let mut expanded = Vec::with_capacity(fixed.len() + rest.len());
                expanded.extend_from_slice(fixed);
                expanded.extend(rest.iter().cloned());
                expanded
            }
            _ => self.arguments.to_vec(),
        }
    }

    pub fn real_call(&self) -> &RealCall {
        &self.real_call
    }

    /// Run the real implementation
    ///
    /// Failures of the implementation are returned untouched. Calling this
    /// for an abstract method fails with [`EngineError::AbstractRealCall`].
    pub fn call_real_method(&self) -> anyhow::Result<Value> {
        self.real_call
            .invoke()
            .unwrap_or_else(|| Err(EngineError::AbstractRealCall(self.method.to_string()).into()))
    }

    pub fn location(&self) -> &CallSiteLocator {
        &self.location
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }
}

impl fmt::Debug for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationRecord")
            .field("mock", &self.mock_id)
            .field("method", &self.method.to_string())
            .field("arguments", &self.arguments)
            .field("real_call", &self.real_call)
            .field("location", &self.location.to_string())
            .field("sequence_number", &self.sequence_number)
            .finish()
    }
}

impl fmt::Display for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.mock_settings.mock_name(), self.method.name())?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}
