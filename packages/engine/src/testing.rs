// packages/engine/src/testing.rs
//! Hand-written surrogate used by the unit tests
//!
//! Mirrors what a surrogate generator emits for
//!
//! ```text
//! trait Inventory {
//!     fn size(&self) -> i64;              // real implementation: Shelf
//!     fn count(&self, sku: &str) -> i64;  // real implementation: Shelf
//!     fn label(&self) -> Option<String>;  // abstract
//! }
//! ```

use crate::interception::dispatch_policy::{intercept_abstract, intercept_concrete};
use crate::interception::mock::{Mock, MockAccess, Surrogate};
use crate::invocation::method::MethodSignature;
use crate::invocation::value::{Value, ValueKind};
use anyhow::anyhow;
use std::any::Any;
use std::sync::Arc;

pub trait Inventory {
    fn size(&self) -> anyhow::Result<i64>;

    fn count(&self, sku: &str) -> anyhow::Result<i64>;

    fn label(&self) -> anyhow::Result<Option<String>>;
}

/// Real implementation behind the concrete methods
#[derive(Debug, Clone, PartialEq)]
pub struct Shelf {
    pub items: Vec<String>,
}

impl Shelf {
    pub fn stocked() -> Self {
        Self {
            items: vec!["apple".into(), "pear".into(), "apple".into()],
        }
    }
}

fn shelf(receiver: &(dyn Any + Send + Sync)) -> anyhow::Result<&Shelf> {
    receiver
        .downcast_ref::<Shelf>()
        .ok_or_else(|| anyhow!("receiver is not a Shelf"))
}

fn shelf_size(receiver: &(dyn Any + Send + Sync), _args: &[Value]) -> anyhow::Result<Value> {
    Ok(Value::Int(shelf(receiver)?.items.len() as i64))
}

fn shelf_count(receiver: &(dyn Any + Send + Sync), args: &[Value]) -> anyhow::Result<Value> {
    let sku = args
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("count expects a sku"))?;
    if sku.is_empty() {
        return Err(anyhow!("empty sku"));
    }
    let n = shelf(receiver)?.items.iter().filter(|item| *item == sku).count();
    Ok(Value::Int(n as i64))
}

pub static SIZE: MethodSignature =
    MethodSignature::new("Inventory", "size", &[], ValueKind::Int).with_dispatch(shelf_size);
pub static COUNT: MethodSignature =
    MethodSignature::new("Inventory", "count", &["&str"], ValueKind::Int).with_dispatch(shelf_count);
pub static LABEL: MethodSignature = MethodSignature::new("Inventory", "label", &[], ValueKind::Str);

static METHODS: [&MethodSignature; 3] = [&SIZE, &COUNT, &LABEL];

pub struct InventoryMock {
    mock: Mock,
    real: Arc<Shelf>,
}

impl MockAccess for InventoryMock {
    fn mock(&self) -> &Mock {
        &self.mock
    }
}

crate::identity_overrides!(InventoryMock);

impl Surrogate for InventoryMock {
    const TYPE_NAME: &'static str = "Inventory";

    fn methods() -> &'static [&'static MethodSignature] {
        &METHODS
    }

    fn from_mock(mock: Mock) -> Self {
        Self {
            mock,
            real: Arc::new(Shelf::stocked()),
        }
    }
}

fn as_i64(value: Value) -> anyhow::Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| anyhow!("expected an integer answer, got {}", value))
}

impl Inventory for InventoryMock {
    #[track_caller]
    fn size(&self) -> anyhow::Result<i64> {
        let real = Arc::clone(&self.real);
        let answer = intercept_concrete(&self.mock, &SIZE, Vec::<Value>::new(), move || {
            shelf_size(real.as_ref(), &[])
        })?;
        as_i64(answer)
    }

    #[track_caller]
    fn count(&self, sku: &str) -> anyhow::Result<i64> {
        let args: Arc<[Value]> = Arc::from(vec![Value::from(sku)]);
        let real = Arc::clone(&self.real);
        let real_args = Arc::clone(&args);
        let answer = intercept_concrete(&self.mock, &COUNT, args, move || {
            shelf_count(real.as_ref(), &real_args)
        })?;
        as_i64(answer)
    }

    #[track_caller]
    fn label(&self) -> anyhow::Result<Option<String>> {
        match intercept_abstract(&self.mock, &LABEL, Vec::<Value>::new())? {
            Value::Null => Ok(None),
            Value::Str(s) => Ok(Some(s)),
            other => Err(anyhow!("expected a string answer, got {}", other)),
        }
    }
}
