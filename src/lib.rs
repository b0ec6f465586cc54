#![doc(test(attr(deny(warnings))))]

//! PsicoSystem: patient intake for a psychological clinic. Two terminal
//! wizards share one domain layer: an emergency triage with a short
//! pre-registration, and a full intake that issues correlative case ids.

pub mod cli;
pub mod config;
pub mod errors;
pub mod intake;
pub mod storage;
pub mod summary;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("PsicoSystem tracing initialized.");
    });
}
