pub mod aggregate;
pub mod chain;
pub mod phase;

pub use aggregate::{
    Actor, CreateWorkflow, Priority, UpdateWorkflow, Workflow, WorkflowService, WorkflowStatus,
    WorkflowStore,
};
pub use chain::PhaseChain;
pub use phase::{CandidateStatus, CustomField, Phase, PhaseStatus, PhaseType};
