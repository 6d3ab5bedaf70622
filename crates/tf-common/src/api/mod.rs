pub mod match_request;
pub mod match_response;
pub mod notification;
pub mod workflow_request;
