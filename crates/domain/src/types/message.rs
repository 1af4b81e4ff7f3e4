//! Message targets, contents and send results

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::constants::{
    BROADCAST_TARGET, FIELD_TO_PARTY, FIELD_TO_TAG, FIELD_TO_USER, TARGET_SEPARATOR,
};

/// Recipients of a message: users, departments ("parties") and tags, or
/// everyone visible to the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTargets {
    pub users: BTreeSet<String>,
    pub parties: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub to_all: bool,
}

impl MessageTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets addressing every member visible to the agent.
    pub fn broadcast() -> Self {
        Self { to_all: true, ..Self::default() }
    }

    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_users(users);
        self
    }

    pub fn with_parties<I, S>(mut self, parties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_parties(parties);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_tags(tags);
        self
    }

    pub fn add_users<I, S>(&mut self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_non_empty(&mut self.users, users);
    }

    pub fn add_parties<I, S>(&mut self, parties: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_non_empty(&mut self.parties, parties);
    }

    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_non_empty(&mut self.tags, tags);
    }

    /// No explicit target and no broadcast.
    pub fn is_empty(&self) -> bool {
        !self.to_all && self.users.is_empty() && self.parties.is_empty() && self.tags.is_empty()
    }

    /// Total number of itemized targets.
    pub fn len(&self) -> usize {
        self.users.len() + self.parties.len() + self.tags.len()
    }

    /// Write `touser` / `toparty` / `totag` into a message envelope.
    ///
    /// A broadcast writes `touser = "@all"` only; the service ignores the
    /// other fields in that case.
    pub fn write_to(&self, body: &mut Map<String, Value>) {
        if self.to_all {
            body.insert(FIELD_TO_USER.into(), Value::String(BROADCAST_TARGET.into()));
            return;
        }
        for (field, set) in [
            (FIELD_TO_USER, &self.users),
            (FIELD_TO_PARTY, &self.parties),
            (FIELD_TO_TAG, &self.tags),
        ] {
            if !set.is_empty() {
                body.insert(field.into(), Value::String(join_targets(set)));
            }
        }
    }
}

fn extend_non_empty<I, S>(set: &mut BTreeSet<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    set.extend(
        items.into_iter().map(Into::into).map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    );
}

fn join_targets(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(&TARGET_SEPARATOR.to_string())
}

/// Outcome of a send: the remote code/message and the targets the service
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSendResult {
    pub errcode: i64,
    pub errmsg: String,
    pub invalid: MessageTargets,
}

impl MessageSendResult {
    pub fn new(errcode: i64, errmsg: impl Into<String>, invalid: MessageTargets) -> Self {
        Self { errcode, errmsg: errmsg.into(), invalid }
    }

    pub fn is_success(&self) -> bool {
        self.errcode == 0
    }

    /// At least one requested target was rejected.
    pub fn has_invalid_targets(&self) -> bool {
        self.invalid.len() > 0
    }
}

/// Text card body: a title, a link and an HTML-ish description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCard {
    pub title: String,
    pub description: String,
    pub url: String,
    pub btn_text: Option<String>,
}

impl TextCard {
    pub fn builder(title: impl Into<String>, url: impl Into<String>) -> TextCardBuilder {
        TextCardBuilder { title: title.into(), url: url.into(), ..TextCardBuilder::default() }
    }
}

/// Collects the parts of a [`TextCard`]; `build` yields an immutable card.
#[derive(Debug, Clone, Default)]
pub struct TextCardBuilder {
    title: String,
    url: String,
    gray: Option<String>,
    normal: Option<String>,
    highlight: Option<String>,
    btn_text: Option<String>,
}

impl TextCardBuilder {
    /// Secondary (gray) description line.
    pub fn gray(mut self, text: impl Into<String>) -> Self {
        self.gray = Some(text.into());
        self
    }

    pub fn normal(mut self, text: impl Into<String>) -> Self {
        self.normal = Some(text.into());
        self
    }

    pub fn highlight(mut self, text: impl Into<String>) -> Self {
        self.highlight = Some(text.into());
        self
    }

    pub fn btn_text(mut self, text: impl Into<String>) -> Self {
        self.btn_text = Some(text.into());
        self
    }

    pub fn build(self) -> TextCard {
        let mut description = String::new();
        for (class, text) in
            [("gray", &self.gray), ("normal", &self.normal), ("highlight", &self.highlight)]
        {
            if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
                description.push_str(&format!("<div class=\"{class}\">{text}</div>"));
            }
        }
        TextCard {
            title: self.title,
            description,
            url: self.url,
            btn_text: self.btn_text.filter(|t| !t.is_empty()),
        }
    }
}

/// Closed set of message kinds with their type-specific payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msgtype", rename_all = "lowercase")]
pub enum MessageContent {
    Text { content: String },
    Image { media_id: String },
    Voice { media_id: String },
    Video { media_id: String, title: Option<String>, description: Option<String> },
    File { media_id: String },
    TextCard(TextCard),
    Markdown { content: String },
}

impl MessageContent {
    /// Value of the envelope's `msgtype` field.
    pub fn msg_type(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Voice { .. } => "voice",
            Self::Video { .. } => "video",
            Self::File { .. } => "file",
            Self::TextCard(_) => "textcard",
            Self::Markdown { .. } => "markdown",
        }
    }

    /// Append the type-specific object (keyed by `msgtype`) to `body`.
    pub fn fill(&self, body: &mut Map<String, Value>) {
        let payload = match self {
            Self::Text { content } | Self::Markdown { content } => json!({ "content": content }),
            Self::Image { media_id } | Self::Voice { media_id } | Self::File { media_id } => {
                json!({ "media_id": media_id })
            }
            Self::Video { media_id, title, description } => {
                let mut video = Map::new();
                video.insert("media_id".into(), Value::String(media_id.clone()));
                if let Some(title) = title {
                    video.insert("title".into(), Value::String(title.clone()));
                }
                if let Some(description) = description {
                    video.insert("description".into(), Value::String(description.clone()));
                }
                Value::Object(video)
            }
            Self::TextCard(card) => {
                let mut textcard = Map::new();
                textcard.insert("title".into(), Value::String(card.title.clone()));
                textcard.insert("description".into(), Value::String(card.description.clone()));
                textcard.insert("url".into(), Value::String(card.url.clone()));
                if let Some(btn_text) = &card.btn_text {
                    textcard.insert("btntxt".into(), Value::String(btn_text.clone()));
                }
                Value::Object(textcard)
            }
        };
        body.insert(self.msg_type().into(), payload);
    }
}

/// A message ready to send: content plus the `safe` (confidential) flag.
///
/// Values are immutable once built; the same message can be sent to many
/// target sets concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    content: MessageContent,
    safe: bool,
}

impl Message {
    pub fn new(content: MessageContent) -> Self {
        Self { content, safe: false }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(MessageContent::Text { content: content.into() })
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Self::new(MessageContent::Markdown { content: content.into() })
    }

    pub fn image(media_id: impl Into<String>) -> Self {
        Self::new(MessageContent::Image { media_id: media_id.into() })
    }

    pub fn voice(media_id: impl Into<String>) -> Self {
        Self::new(MessageContent::Voice { media_id: media_id.into() })
    }

    pub fn file(media_id: impl Into<String>) -> Self {
        Self::new(MessageContent::File { media_id: media_id.into() })
    }

    pub fn video(
        media_id: impl Into<String>,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self::new(MessageContent::Video { media_id: media_id.into(), title, description })
    }

    pub fn text_card(card: TextCard) -> Self {
        Self::new(MessageContent::TextCard(card))
    }

    /// Mark the message confidential (`safe = 1`).
    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn is_safe(&self) -> bool {
        self.safe
    }

    pub fn msg_type(&self) -> &'static str {
        self.content.msg_type()
    }
}
