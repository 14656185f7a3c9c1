pub mod message;
pub mod notifier;
pub mod providers;
pub mod template;

pub use message::{Attachment, AttachmentField, ChatMessage};
pub use notifier::{Notifier, NotifyError};
pub use providers::{SlackConfig, SlackNotifier};
pub use template::{
    account_summary, format_time, render_event, resource_summary, Template, ALL_ACCOUNTS,
    ALL_RESOURCES,
};
