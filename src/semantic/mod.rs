//! Semantic validation of parsed queries.
//!
//! The validator runs five independent passes over a [`Query`](crate::ast::Query),
//! each appending to the same list of findings:
//!
//! 1. **Structure** - SELECT and FROM are present
//! 2. **Resource** - the FROM resource is known
//! 3. **Fields** - every selected, filtered and ordered field has a known prefix
//!    (and a known attribute, for prefixes with a catalogue)
//! 4. **Operators** - each condition's operator is allowed for its field
//! 5. **Parameters** - every PARAMETERS key is known
//!
//! # Example
//!
//! ```
//! use gaql_validator::semantic::{FindingKind, Validator};
//!
//! let result = Validator::new()
//!     .validate("SELECT campaign.id FROM campaing", false)
//!     .unwrap();
//! assert!(!result.valid);
//! assert_eq!(result.errors[0].kind, FindingKind::Resource);
//! ```

mod finding;
mod reference;
mod validator;

pub use finding::{Finding, FindingKind, Location, Target};
pub use reference::{DATE_FIELD_OPERATORS, ReferenceTables, ReferenceTablesBuilder};
pub use validator::{Validation, ValidationConfig, Validator};
