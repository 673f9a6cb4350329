//! Access control for generated statements.
//!
//! The embedding application supplies an [`AccessControlProvider`]: one
//! [`AclFactory`] per operation kind. For every request the
//! [`AccessControlDispatcher`] picks the factory matching the classified
//! operation and returns the Cypher fragments it produced, wrapped in an
//! [`AclOutcome`].
//!
//! ```ignore
//! use neograph_auth::access::{AccessControlProvider, AclResult};
//! use neograph_auth::OperationKind;
//!
//! let provider = AccessControlProvider::new().with_factory(
//!     OperationKind::NodeRead,
//!     |ctx: &RequestContext, _op: &OperationDescriptor| {
//!         Ok(AclResult::new().with_where("this.owner = $cypherParams.userId"))
//!     },
//! );
//! ```

mod dispatch;
mod provider;

pub use dispatch::{AccessControlDispatcher, AclOutcome, dispatch};
pub use provider::{AccessControlProvider, AclError, AclFactory, AclResult};
