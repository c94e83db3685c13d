// packages/engine/src/interception/identity.rs
//! Identity-based equality and hashing for mocks
//!
//! Mocks stand in for arbitrary types, some of which define structural
//! equality. A mock must instead behave like a distinct object: equal only to
//! itself, hashed by identity. These two functions are that behavior; `Mock`
//! uses them, and [`identity_overrides!`](crate::identity_overrides) attaches
//! them to surrogate types.

use crate::interception::mock::MockAccess;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

/// Hash derived from the mock instance's identity only
pub fn identity_hash<M: MockAccess + ?Sized>(instance: &M) -> u64 {
    let mut hasher = DefaultHasher::new();
    std::ptr::hash(instance.mock().instance_ptr(), &mut hasher);
    hasher.finish()
}

/// True iff both refer to the very same mock instance
pub fn identity_equals<A, B>(instance: &A, other: &B) -> bool
where
    A: MockAccess + ?Sized,
    B: MockAccess + ?Sized,
{
    std::ptr::eq(instance.mock().instance_ptr(), other.mock().instance_ptr())
}

/// Give a surrogate type identity-based `PartialEq`, `Eq` and `Hash`
///
/// ```ignore
/// struct InventoryMock { mock: Mock }
/// impl MockAccess for InventoryMock { fn mock(&self) -> &Mock { &self.mock } }
/// mockcall_engine::identity_overrides!(InventoryMock);
/// ```
#[macro_export]
macro_rules! identity_overrides {
    ($surrogate:ty) => {
        impl ::std::cmp::PartialEq for $surrogate {
            fn eq(&self, other: &Self) -> bool {
                $crate::interception::identity::identity_equals(self, other)
            }
        }

        impl ::std::cmp::Eq for $surrogate {}

        impl ::std::hash::Hash for $surrogate {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                state.write_u64($crate::interception::identity::identity_hash(self));
            }
        }
    };
}
