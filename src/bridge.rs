//! Collaborator traits for the install-prompt and native-container bridges.
//!
//! The avatar core never needs the internals of these adapters: the
//! install prompt is two calls, and the container bridge is one structured
//! outbound message plus an inbound open-url dispatch. Transport details
//! (WebSocket listeners, postMessage fallbacks) stay entirely behind the
//! trait implementations.

use crate::foundation::error::RoundelResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// User's answer to an install prompt.
pub enum InstallOutcome {
    /// The user accepted the install.
    Accepted,
    /// The user dismissed the prompt.
    Dismissed,
}

/// Install-prompt (PWA) bridge collaborator.
pub trait InstallPrompt {
    /// Whether a deferred install prompt is currently available.
    fn prompt_available(&self) -> bool;

    /// Show the prompt and report the user's choice.
    fn request_install(&mut self) -> RoundelResult<InstallOutcome>;
}

/// Native-container messaging bridge collaborator.
pub trait ContainerBridge {
    /// Send one structured message to the container.
    fn post_structured_message(
        &self,
        kind: &str,
        payload: &serde_json::Value,
    ) -> RoundelResult<()>;

    /// Handle a URL dispatched from the container.
    fn dispatch_remote_url(&self, url: &str) -> RoundelResult<()>;
}

/// Ask the container to open a URL.
pub fn open_remote_url(bridge: &dyn ContainerBridge, url: &str) -> RoundelResult<()> {
    bridge.post_structured_message("openUrl", &serde_json::json!({ "url": url }))
}

#[cfg(test)]
#[path = "../tests/unit/bridge.rs"]
mod tests;
