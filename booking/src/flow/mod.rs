//! The booking flow: venue detail, slot selection, player count, payment
//! and confirmation, as a single reducer over typed stage contexts.

pub mod params;
pub mod reducer;
pub mod types;

pub use params::{NavigationParams, ParamsTarget};
pub use reducer::{FlowEnvironment, FlowReducer};
pub use types::{
    BookingFlowState, BookingStage, Confirmation, ExitDestination, FlowAction, PaymentMethod,
    PaymentSummary, PlayerSelection, SlotChoice, SlotSelection,
};
