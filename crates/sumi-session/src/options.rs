//! Options normalization: partial caller configuration → complete session
//! configuration.
//!
//! [`EditorOptions`] is what hosts construct — everything optional, builder
//! methods for ergonomics. [`EditorOptions::resolve()`] is a pure merge with
//! no I/O: every recognized option takes its documented default unless
//! supplied, and caller values win. The result, [`SessionOptions`], is
//! immutable for the session's lifetime.
//!
//! Merge rules beyond plain defaulting:
//!
//! - `storage_key` precedence: explicit key > session id > fixed constant
//! - `extensions`: default capability set first, caller additions appended
//! - `editor_props`: default prop map overlaid by caller entries, caller
//!   wins per key
//! - `slash_commands`: built-in command set first, caller additions appended

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sumi_types::{ChangeEvent, Content, SessionId, SlashCommand};

use crate::constants::{
    DEFAULT_COMPLETION_API, DEFAULT_CONTAINER_CLASS, DEFAULT_DEBOUNCE, DEFAULT_PLACEHOLDER_TEXT,
    DEFAULT_STORAGE_KEY,
};
use crate::intercept::{InterceptorChain, UpdateInterceptor};

/// Immediate-update callback, fired synchronously on every non-suppressed
/// change event.
pub type UpdateCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Debounced-update callback, fired once per quiet period with the document
/// as of the last change in the window.
pub type DebouncedCallback = Arc<dyn Fn(&Content) + Send + Sync>;

/// Document-engine prop map (opaque to the controller).
pub type EngineProps = serde_json::Map<String, serde_json::Value>;

/// One document-engine capability with its config.
///
/// The controller treats these as data: it assembles the list and hands it
/// to the engine, which decides what each name means.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
}

impl Extension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: serde_json::Value::Null,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

/// Partial session configuration as supplied by the host.
#[derive(Default)]
pub struct EditorOptions {
    pub id: Option<SessionId>,
    pub completion_api: Option<String>,
    pub container_class: Option<String>,
    pub default_value: Option<Content>,
    pub extensions: Vec<Extension>,
    pub editor_props: EngineProps,
    pub on_update: Option<UpdateCallback>,
    pub on_debounced_update: Option<DebouncedCallback>,
    pub debounce_duration: Option<Duration>,
    pub storage_key: Option<String>,
    pub disable_persistence: bool,
    pub placeholder_text: Option<String>,
    pub slash_commands: Vec<SlashCommand>,
    pub interceptors: Vec<Arc<dyn UpdateInterceptor>>,
}

impl EditorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_completion_api(mut self, endpoint: impl Into<String>) -> Self {
        self.completion_api = Some(endpoint.into());
        self
    }

    pub fn with_container_class(mut self, class: impl Into<String>) -> Self {
        self.container_class = Some(class.into());
        self
    }

    pub fn with_default_value(mut self, content: impl Into<Content>) -> Self {
        self.default_value = Some(content.into());
        self
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.editor_props.insert(key.into(), value);
        self
    }

    pub fn on_update(mut self, f: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Arc::new(f));
        self
    }

    pub fn on_debounced_update(mut self, f: impl Fn(&Content) + Send + Sync + 'static) -> Self {
        self.on_debounced_update = Some(Arc::new(f));
        self
    }

    pub fn with_debounce_duration(mut self, window: Duration) -> Self {
        self.debounce_duration = Some(window);
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn with_persistence_disabled(mut self) -> Self {
        self.disable_persistence = true;
        self
    }

    pub fn with_placeholder_text(mut self, text: impl Into<String>) -> Self {
        self.placeholder_text = Some(text.into());
        self
    }

    pub fn with_slash_command(mut self, command: SlashCommand) -> Self {
        self.slash_commands.push(command);
        self
    }

    pub fn with_interceptor(mut self, interceptor: impl UpdateInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Normalize into a complete configuration. Pure — no I/O, no clock.
    pub fn resolve(self) -> SessionOptions {
        let placeholder_text = self
            .placeholder_text
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_TEXT.to_string());

        let mut slash_commands = default_slash_commands();
        slash_commands.extend(self.slash_commands);

        let mut extensions = default_extensions(&placeholder_text, &slash_commands);
        extensions.extend(self.extensions);

        let mut editor_props = default_engine_props();
        for (key, value) in self.editor_props {
            editor_props.insert(key, value);
        }

        let storage_key = match (self.storage_key, self.id) {
            (Some(key), _) => key,
            (None, Some(id)) => format!("sumi__{}", id.to_hex()),
            (None, None) => DEFAULT_STORAGE_KEY.to_string(),
        };

        SessionOptions {
            id: self.id,
            completion_api: self
                .completion_api
                .unwrap_or_else(|| DEFAULT_COMPLETION_API.to_string()),
            container_class: self
                .container_class
                .unwrap_or_else(|| DEFAULT_CONTAINER_CLASS.to_string()),
            default_value: self.default_value.unwrap_or_default(),
            extensions,
            editor_props,
            on_update: self.on_update.unwrap_or_else(|| Arc::new(|_| {})),
            on_debounced_update: self.on_debounced_update.unwrap_or_else(|| Arc::new(|_| {})),
            debounce_duration: self.debounce_duration.unwrap_or(DEFAULT_DEBOUNCE),
            storage_key,
            disable_persistence: self.disable_persistence,
            placeholder_text,
            slash_commands,
            interceptors: InterceptorChain::from_vec(self.interceptors),
        }
    }
}

impl std::fmt::Debug for EditorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorOptions")
            .field("id", &self.id)
            .field("completion_api", &self.completion_api)
            .field("storage_key", &self.storage_key)
            .field("disable_persistence", &self.disable_persistence)
            .field("debounce_duration", &self.debounce_duration)
            .field("extensions", &self.extensions.len())
            .field("slash_commands", &self.slash_commands.len())
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

/// Complete session configuration. Every field resolved.
#[derive(Clone)]
pub struct SessionOptions {
    pub id: Option<SessionId>,
    pub completion_api: String,
    pub container_class: String,
    pub default_value: Content,
    pub extensions: Vec<Extension>,
    pub editor_props: EngineProps,
    pub on_update: UpdateCallback,
    pub on_debounced_update: DebouncedCallback,
    pub debounce_duration: Duration,
    pub storage_key: String,
    pub disable_persistence: bool,
    pub placeholder_text: String,
    pub slash_commands: Vec<SlashCommand>,
    pub interceptors: InterceptorChain,
}

impl std::fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOptions")
            .field("id", &self.id)
            .field("completion_api", &self.completion_api)
            .field("storage_key", &self.storage_key)
            .field("disable_persistence", &self.disable_persistence)
            .field("debounce_duration", &self.debounce_duration)
            .field("extensions", &self.extensions.len())
            .field("slash_commands", &self.slash_commands.len())
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

/// Built-in slash-menu commands. Caller additions append after these.
fn default_slash_commands() -> Vec<SlashCommand> {
    vec![
        SlashCommand::new("Continue writing")
            .description("Use AI to expand your thoughts.")
            .keyword("ai")
            .keyword("autocomplete"),
        SlashCommand::new("Text")
            .description("Just start typing with plain text.")
            .keyword("paragraph"),
        SlashCommand::new("To-do List")
            .description("Track tasks with a to-do list.")
            .keyword("todo")
            .keyword("checkbox"),
        SlashCommand::new("Heading 1")
            .description("Big section heading.")
            .keyword("title")
            .keyword("h1"),
        SlashCommand::new("Heading 2")
            .description("Medium section heading.")
            .keyword("subtitle")
            .keyword("h2"),
        SlashCommand::new("Heading 3")
            .description("Small section heading.")
            .keyword("h3"),
        SlashCommand::new("Bullet List")
            .description("Create a simple bullet list.")
            .keyword("unordered"),
        SlashCommand::new("Numbered List")
            .description("Create a list with numbering.")
            .keyword("ordered"),
        SlashCommand::new("Quote")
            .description("Capture a quote.")
            .keyword("blockquote"),
        SlashCommand::new("Code")
            .description("Capture a code snippet.")
            .keyword("codeblock"),
    ]
}

/// Default engine capability set. The placeholder and slash-menu entries
/// carry the resolved placeholder text and merged command list as config.
fn default_extensions(placeholder_text: &str, commands: &[SlashCommand]) -> Vec<Extension> {
    vec![
        Extension::new("rich-text"),
        Extension::new("link"),
        Extension::new("image"),
        Extension::new("task-list"),
        Extension::new("markdown"),
        Extension::new("placeholder")
            .with_config(serde_json::json!({ "text": placeholder_text })),
        Extension::new("slash-menu").with_config(serde_json::json!({
            "commands": commands,
        })),
    ]
}

fn default_engine_props() -> EngineProps {
    let mut props = EngineProps::new();
    props.insert("autofocus".into(), serde_json::json!("end"));
    props.insert("spellcheck".into(), serde_json::json!(true));
    props
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sumi_types::Transaction;

    #[test]
    fn test_defaults_applied_when_unset() {
        let opts = EditorOptions::new().resolve();
        assert_eq!(opts.completion_api, DEFAULT_COMPLETION_API);
        assert_eq!(opts.container_class, DEFAULT_CONTAINER_CLASS);
        assert_eq!(opts.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(opts.debounce_duration, DEFAULT_DEBOUNCE);
        assert_eq!(opts.placeholder_text, DEFAULT_PLACEHOLDER_TEXT);
        assert_eq!(opts.default_value, Content::empty());
        assert!(!opts.disable_persistence);
        assert!(opts.interceptors.is_empty());
    }

    #[test]
    fn test_supplied_values_override_defaults() {
        let opts = EditorOptions::new()
            .with_completion_api("/v2/complete")
            .with_container_class("host-editor")
            .with_default_value("seed text")
            .with_debounce_duration(Duration::from_millis(100))
            .with_placeholder_text("Write here")
            .resolve();

        assert_eq!(opts.completion_api, "/v2/complete");
        assert_eq!(opts.container_class, "host-editor");
        assert_eq!(opts.default_value, Content::from("seed text"));
        assert_eq!(opts.debounce_duration, Duration::from_millis(100));
        assert_eq!(opts.placeholder_text, "Write here");
    }

    #[test]
    fn test_storage_key_precedence() {
        // Explicit key beats everything
        let id = SessionId::new();
        let opts = EditorOptions::new()
            .with_id(id)
            .with_storage_key("my-doc")
            .resolve();
        assert_eq!(opts.storage_key, "my-doc");

        // Session id beats the constant
        let opts = EditorOptions::new().with_id(id).resolve();
        assert_eq!(opts.storage_key, format!("sumi__{}", id.to_hex()));

        // Constant is the floor
        let opts = EditorOptions::new().resolve();
        assert_eq!(opts.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_extensions_merge_defaults_first() {
        let opts = EditorOptions::new()
            .with_extension(Extension::new("custom-highlight"))
            .resolve();

        let names: Vec<&str> = opts.extensions.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"rich-text"));
        assert!(names.contains(&"placeholder"));
        assert!(names.contains(&"slash-menu"));
        // Caller extension appended after defaults
        assert_eq!(*names.last().unwrap(), "custom-highlight");
    }

    #[test]
    fn test_placeholder_text_flows_into_extension_config() {
        let opts = EditorOptions::new()
            .with_placeholder_text("Start typing")
            .resolve();
        let placeholder = opts
            .extensions
            .iter()
            .find(|e| e.name == "placeholder")
            .unwrap();
        assert_eq!(placeholder.config["text"], "Start typing");
    }

    #[test]
    fn test_slash_commands_merge_and_flow_into_menu_config() {
        let opts = EditorOptions::new()
            .with_slash_command(SlashCommand::new("Insert Chart").keyword("graph"))
            .resolve();

        // Built-ins first, caller command appended
        assert_eq!(opts.slash_commands.first().unwrap().title, "Continue writing");
        assert_eq!(opts.slash_commands.last().unwrap().title, "Insert Chart");

        let menu = opts
            .extensions
            .iter()
            .find(|e| e.name == "slash-menu")
            .unwrap();
        let commands = menu.config["commands"].as_array().unwrap();
        assert_eq!(commands.len(), opts.slash_commands.len());
    }

    #[test]
    fn test_editor_props_overlay_caller_wins() {
        let opts = EditorOptions::new()
            .with_prop("spellcheck", serde_json::json!(false))
            .with_prop("dir", serde_json::json!("rtl"))
            .resolve();

        assert_eq!(opts.editor_props["spellcheck"], serde_json::json!(false));
        assert_eq!(opts.editor_props["dir"], serde_json::json!("rtl"));
        // Untouched default survives
        assert_eq!(opts.editor_props["autofocus"], serde_json::json!("end"));
    }

    #[test]
    fn test_default_callbacks_are_noops() {
        let opts = EditorOptions::new().resolve();
        let event = ChangeEvent::new(Content::from("x"), Transaction::insert(1));
        (opts.on_update)(&event);
        (opts.on_debounced_update)(&Content::from("x"));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let a = EditorOptions::new()
            .with_storage_key("doc")
            .with_placeholder_text("hi")
            .resolve();
        let b = EditorOptions::new()
            .with_storage_key("doc")
            .with_placeholder_text("hi")
            .resolve();

        assert_eq!(a.storage_key, b.storage_key);
        assert_eq!(a.extensions, b.extensions);
        assert_eq!(a.editor_props, b.editor_props);
        assert_eq!(a.slash_commands, b.slash_commands);
    }

    #[test]
    fn test_interceptors_preserved_in_order() {
        let opts = EditorOptions::new()
            .with_interceptor(|_: &ChangeEvent| false)
            .with_interceptor(|_: &ChangeEvent| true)
            .resolve();
        assert_eq!(opts.interceptors.len(), 2);
    }
}
