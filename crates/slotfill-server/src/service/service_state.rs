//! Application state and dependency injection.

use slotfill_core::SlotFillingService;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection). Holds the model
/// handle loaded at startup; it is never replaced while the server runs.
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    slot_filling: SlotFillingService,
}

impl ServiceState {
    /// Creates the state around an already loaded model.
    pub fn new(slot_filling: SlotFillingService) -> Self {
        Self { slot_filling }
    }

    /// Creates the state around the gazetteer mock model.
    #[cfg(test)]
    pub(crate) fn mock() -> Self {
        Self::new(SlotFillingService::mock())
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(slot_filling: SlotFillingService);
