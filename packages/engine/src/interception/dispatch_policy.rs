// packages/engine/src/interception/dispatch_policy.rs
//! Entry points called from surrogate method bodies
//!
//! Each overridable method is bound, once and at generation time, to one of
//! two entry points:
//!
//! - [`intercept_concrete`] for methods with a real implementation. This
//!   binding always wins when a real implementation exists.
//! - [`intercept_abstract`] for methods without one.
//!
//! Both tolerate a mock whose dispatcher is not attached yet (a surrogate
//! still under construction): the concrete path runs the real
//! implementation, the abstract path returns the default stub, and neither
//! records anything or touches the handler.

use crate::interception::mock::Mock;
use crate::invocation::method::MethodSignature;
use crate::invocation::record::RealCall;
use crate::invocation::value::Value;
use crate::observability::names;
use std::sync::Arc;
use tracing::trace;

/// Entry point a method is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Concrete,
    Abstract,
}

impl Binding {
    pub fn for_method(method: &MethodSignature) -> Self {
        if method.is_abstract() {
            Binding::Abstract
        } else {
            Binding::Concrete
        }
    }
}

/// Intercept a call to a method that has a real implementation
///
/// `real` runs the real implementation; it is handed to the handler as
/// a [`RealCall::CanInvoke`] and only runs if the handler asks for it.
#[track_caller]
pub fn intercept_concrete<F>(
    mock: &Mock,
    method: &'static MethodSignature,
    arguments: impl Into<Arc<[Value]>>,
    real: F,
) -> anyhow::Result<Value>
where
    F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
{
    let Some(dispatcher) = mock.dispatcher() else {
        trace!("{} has no dispatcher, calling real {}", mock, method.name());
        metrics::counter!(names::UNATTACHED_CALLS).increment(1);
        return real();
    };

    let answer = dispatcher.intercept(mock, method, arguments, RealCall::invokable(real))?;
    Ok(answer_or_default(method, answer))
}

/// Intercept a call to a method without a real implementation
#[track_caller]
pub fn intercept_abstract(
    mock: &Mock,
    method: &'static MethodSignature,
    arguments: impl Into<Arc<[Value]>>,
) -> anyhow::Result<Value> {
    let Some(dispatcher) = mock.dispatcher() else {
        trace!("{} has no dispatcher, stubbing {}", mock, method.name());
        metrics::counter!(names::UNATTACHED_CALLS).increment(1);
        return Ok(method.return_kind().default_stub());
    };

    let answer = dispatcher.intercept(mock, method, arguments, RealCall::NotApplicable)?;
    Ok(answer_or_default(method, answer))
}

fn answer_or_default(method: &MethodSignature, answer: Option<Value>) -> Value {
    answer.unwrap_or_else(|| {
        metrics::counter!(names::DEFAULT_STUBS).increment(1);
        method.return_kind().default_stub()
    })
}
