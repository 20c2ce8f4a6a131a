//! Core domain entities
//!
//! Records, credentials and call outcomes. These are pure data structures
//! with mapping and classification logic - no I/O.

pub mod auth;
mod bank;
pub mod call;
mod extraction;
pub mod lenient;
mod property;
pub mod result;

pub use auth::{AuthHeader, AuthIdentity};
pub use bank::{BankMap, BankRecord};
pub use call::{CallError, CallErrorKind, CallResult, ServerErrorDetail};
pub use extraction::{Extraction, UnitRecord};
pub use property::{PropertyAddress, PropertyDefaults, PropertyDetail, PropertyRecord};
