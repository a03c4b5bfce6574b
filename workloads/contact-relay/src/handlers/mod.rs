//! Submission handlers, one per route.
//!
//! Each handler reads only the configuration its route needs, validates the
//! body, then calls its collaborators in a fixed order.

pub mod conductor;
pub mod contact_us;
pub mod form;
