pub mod activity_log;
pub mod company;
pub mod email_message;
pub mod email_reply;
pub mod integration;
pub mod lead;
pub mod template;
pub mod user;

// Re-export common types
pub use activity_log::{ActivityLog, NewActivityLog};
pub use company::{Company, CompanyUpdate, NewCompany};
pub use email_message::{EmailMessage, NewEmailMessage};
pub use email_reply::{EmailReply, NewEmailReply, SendStatus};
pub use integration::{EmailIntegration, IntegrationStatus, NewEmailIntegration};
pub use lead::{Lead, LeadStatus, LeadUpdate, NewLead};
pub use template::{AutoReplyTemplate, NewAutoReplyTemplate, TemplateUpdate, TriggerType};
pub use user::{NewUser, User, UserRole};
