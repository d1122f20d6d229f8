//! Template binding
//!
//! Turns a [`TemplateSet`] plus an evaluation context into an
//! [`EventPayload`](crate::payload::EventPayload), and derives the optional
//! presence metric from the bound event.
//!
//! # Implementation Model
//!
//! [`bind_event`] evaluates each template through an
//! [`Activation`](crate::expr::Activation) in a fixed order and stops at the
//! first failure, returning a [`BindError`] that names the field. Evaluations
//! are independent and side-effect free, so the order only determines which
//! error is reported when several templates are broken.
//!
//! [`derive_metric`] is a pure function over an already-bound payload. It copies
//! tags and the element identifier structurally and never evaluates anything.

mod bind_error;
mod binder;
mod metric;
mod template_set;

pub use bind_error::BindError;
pub use binder::{bind_event, bind_metric_name};
pub use metric::derive_metric;
pub use template_set::TemplateSet;
