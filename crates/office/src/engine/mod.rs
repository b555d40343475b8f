pub mod deadline_engine;
pub mod mediation_workflow;
pub mod signature;
