//! Propagation context and context-carried loggers
//!
//! [`Context`] is an immutable chain of values keyed by type. Deriving a new
//! context never modifies the parent, so a context can be shared freely
//! between threads and handed down a call graph; a callee that binds an
//! enriched logger only affects the contexts it passes further down.

use super::extract::{extract_fields, LogFields};
use super::field_value::FieldValue;
use super::fields::FieldSet;
use super::logger::Logger;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

struct Node {
    parent: Option<Arc<Node>>,
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
}

/// Immutable, chainable key-value carrier
///
/// ```
/// use logwrap::Context;
///
/// #[derive(Debug, PartialEq)]
/// struct TenantId(u32);
///
/// let root = Context::background();
/// let scoped = root.with_value(TenantId(7));
///
/// assert_eq!(scoped.value::<TenantId>(), Some(&TenantId(7)));
/// assert!(root.value::<TenantId>().is_none());
/// ```
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// An empty context
    pub fn background() -> Self {
        Self { head: None }
    }

    /// Derive a context carrying `value`; shadows any earlier value of the
    /// same type
    #[must_use]
    pub fn with_value<T>(&self, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Node {
                parent: self.head.clone(),
                key: TypeId::of::<T>(),
                value: Arc::new(value),
            })),
        }
    }

    /// Nearest value of type `T` in the chain
    pub fn value<T>(&self) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        let key = TypeId::of::<T>();
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            if current.key == key {
                return current.value.downcast_ref::<T>();
            }
            node = current.parent.as_deref();
        }
        None
    }

    /// Number of values in the chain, including shadowed ones
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            depth += 1;
            node = current.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("depth", &self.depth()).finish()
    }
}

/// The logger bound to `ctx`, or a disabled logger when none is bound
pub fn from_ctx(ctx: &Context) -> Logger {
    ctx.value::<Logger>().cloned().unwrap_or_else(Logger::disabled)
}

/// A new context with `logger` bound to it
#[must_use]
pub fn with_ctx(ctx: &Context, logger: Logger) -> Context {
    ctx.with_value(logger)
}

/// The bound logger enriched with one field
pub fn from_ctx_with_field<K, V>(ctx: &Context, key: K, value: V) -> Logger
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    from_ctx(ctx).with_field(key, value)
}

/// The bound logger enriched with a field set
pub fn from_ctx_with_fields(ctx: &Context, fields: &FieldSet) -> Logger {
    from_ctx(ctx).with_fields(fields)
}

/// The bound logger enriched with fields extracted from `value`
pub fn from_ctx_with_struct<T>(ctx: &Context, value: &T) -> Logger
where
    T: LogFields + ?Sized,
{
    from_ctx_with_fields(ctx, &extract_fields(value))
}

/// A new context whose bound logger carries one more field
#[must_use]
pub fn ctx_with_field<K, V>(ctx: &Context, key: K, value: V) -> Context
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    with_ctx(ctx, from_ctx_with_field(ctx, key, value))
}

/// A new context whose bound logger carries `fields`
#[must_use]
pub fn ctx_with_fields(ctx: &Context, fields: &FieldSet) -> Context {
    with_ctx(ctx, from_ctx_with_fields(ctx, fields))
}

/// A new context whose bound logger carries the fields extracted from `value`
#[must_use]
pub fn ctx_with_struct<T>(ctx: &Context, value: &T) -> Context
where
    T: LogFields + ?Sized,
{
    with_ctx(ctx, from_ctx_with_struct(ctx, value))
}
