//! Tax receipt issuance.
//!
//! - `model` - ids, records, outcomes and the page view model
//! - `ports` - traits for the external collaborators
//! - `flow` - the issuance state machine and download handshake
//! - `error` - fatal error kinds and their HTTP mapping

pub mod error;
pub mod flow;
pub mod model;
pub mod ports;


pub use error::{GeneratorError, ReceiptError};
pub use flow::{Collaborators, ReceiptIssuanceFlow};
pub use model::*;
