// All service modules
pub mod agent;
pub mod wallet_actions;

pub use agent::AgentPipeline;
