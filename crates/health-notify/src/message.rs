use serde::{Deserialize, Serialize};

/// 附件字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl AttachmentField {
    pub fn short(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: true,
        }
    }

    pub fn long(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: false,
        }
    }
}

/// 消息附件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// 强调色（十六进制或 good/warning/danger）
    pub color: String,
    pub fields: Vec<AttachmentField>,
}

/// 聊天消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 标题行（Slack mrkdwn）
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, attachment: Attachment) -> Self {
        Self {
            text: text.into(),
            attachments: vec![attachment],
        }
    }

    /// 按标题查找字段
    pub fn field(&self, title: &str) -> Option<&AttachmentField> {
        self.attachments
            .iter()
            .flat_map(|a| a.fields.iter())
            .find(|f| f.title == title)
    }

    pub fn field_titles(&self) -> Vec<&str> {
        self.attachments
            .iter()
            .flat_map(|a| a.fields.iter())
            .map(|f| f.title.as_str())
            .collect()
    }
}
