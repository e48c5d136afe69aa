pub mod status_transition_service;

pub use status_transition_service::{
    parse_booking_id, StatusChangeRequest, StatusTransitionService, TransitionResult,
};
