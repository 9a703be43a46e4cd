//! Confirmation handler - turns a reviewed draft into a ledger entry.

mod confirmation_model;
mod confirmation_service;


pub use confirmation_model::{
    ConfirmDraftRequest, ConfirmationResult, ReversalResult, ReverseDonationRequest,
};
pub use confirmation_service::{ConfirmationService, ConfirmationServiceTrait};
