pub mod activity;
pub mod ai_client;
pub mod auth;
pub mod chat;
pub mod classification;
pub mod delivery;
pub mod intake;
pub mod integrations;
pub mod leads;
pub mod orchestrator;
pub mod rate_limit;
pub mod task_queue;
pub mod templates;

pub use ai_client::AiClient;
pub use auth::JwtService;
pub use task_queue::{start_task_runner, Task, TaskQueue};
