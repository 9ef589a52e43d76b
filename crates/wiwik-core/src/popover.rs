//! Popover configuration.
//!
//! A popover trigger either names an element whose content it shows, or
//! falls back to the share-link template (click the body to copy the link).

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

/// Hint shown under share links.
pub const SHARE_LINK_HINT: &str = "Click the link to copy to clipboard";

pub const SHOW_DELAY: Duration = Duration::from_millis(300);
pub const HIDE_DELAY: Duration = Duration::from_millis(1000);

/// Element a trigger is attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopoverTrigger {
    pub title: String,
    /// Body text (the link, for share popovers).
    pub body: String,
    /// Id of the element holding rich content.
    pub content_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopoverConfig {
    /// Rich content copied from another element.
    Content {
        content: String,
        container: &'static str,
        html: bool,
        show_delay: Duration,
        hide_delay: Duration,
    },
    /// Share-link template: clicking the body copies it.
    ShareLink {
        title: String,
        link: String,
        hint: &'static str,
    },
}

impl PopoverConfig {
    /// Text copied to the clipboard when the popover body is clicked.
    pub fn copy_text(&self) -> Option<&str> {
        match self {
            Self::ShareLink { link, .. } => Some(link),
            Self::Content { .. } => None,
        }
    }
}

/// Build the configuration for `trigger`, resolving content ids against
/// `contents`. A content id that resolves to nothing yields empty content.
pub fn configure(trigger: &PopoverTrigger, contents: &HashMap<String, String>) -> PopoverConfig {
    match &trigger.content_id {
        Some(id) => {
            let content = contents.get(id).cloned().unwrap_or_default();
            debug!(%id, found = !content.is_empty(), "Content popover");
            PopoverConfig::Content {
                content,
                container: "body",
                html: true,
                show_delay: SHOW_DELAY,
                hide_delay: HIDE_DELAY,
            }
        }
        None => PopoverConfig::ShareLink {
            title: trigger.title.clone(),
            link: trigger.body.clone(),
            hint: SHARE_LINK_HINT,
        },
    }
}

/// Configure every trigger on a page.
pub fn configure_all(
    triggers: &[PopoverTrigger],
    contents: &HashMap<String, String>,
) -> Vec<PopoverConfig> {
    triggers.iter().map(|t| configure(t, contents)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn contents() -> HashMap<String, String> {
        HashMap::from([("bounty-help".to_string(), "<b>Bounties</b> explained".to_string())])
    }

    #[test]
    fn content_id_yields_content_popover() {
        let trigger = PopoverTrigger {
            content_id: Some("bounty-help".into()),
            ..PopoverTrigger::default()
        };
        let config = configure(&trigger, &contents());
        assert_eq!(
            config,
            PopoverConfig::Content {
                content: "<b>Bounties</b> explained".into(),
                container: "body",
                html: true,
                show_delay: Duration::from_millis(300),
                hide_delay: Duration::from_millis(1000),
            }
        );
        assert_eq!(config.copy_text(), None);
    }

    #[test]
    fn missing_content_id_uses_share_template() {
        let trigger = PopoverTrigger {
            title: "Share".into(),
            body: "https://forum.test/question/7".into(),
            content_id: None,
        };
        let config = configure(&trigger, &contents());
        assert_eq!(config.copy_text(), Some("https://forum.test/question/7"));
        assert!(matches!(
            config,
            PopoverConfig::ShareLink { hint: SHARE_LINK_HINT, .. }
        ));
    }

    #[test]
    fn unknown_content_id_is_empty() {
        let trigger = PopoverTrigger {
            content_id: Some("nope".into()),
            ..PopoverTrigger::default()
        };
        let configs = configure_all(&[trigger], &contents());
        assert!(matches!(&configs[0], PopoverConfig::Content { content, .. } if content.is_empty()));
    }
}
