//! Rendering port for the presentation loop.
//!
//! The terminal renderer in davood-cli implements this; tests use a
//! recording view. Methods take `&self` so a view can be shared with a
//! session driven from several tasks.

use davood_types::chat::Message;
use davood_types::error::ChatError;
use davood_types::notice::Toast;

pub trait ChatView: Send + Sync {
    /// Show one message. `formatted` enables inline markup rendering; restored
    /// transcript entries are shown as plain text.
    fn render_message(&self, message: &Message, formatted: bool) -> Result<(), ChatError>;

    /// Show or hide the "typing" indicator.
    fn set_typing(&self, visible: bool);

    /// Drop the oldest rendered message.
    fn evict_oldest(&self);

    /// How many messages are currently rendered.
    fn rendered_count(&self) -> usize;

    /// Remove every rendered message.
    fn clear(&self);

    /// Show a transient notification.
    fn toast(&self, toast: &Toast);
}

impl<T: ChatView + ?Sized> ChatView for std::sync::Arc<T> {
    fn render_message(&self, message: &Message, formatted: bool) -> Result<(), ChatError> {
        (**self).render_message(message, formatted)
    }

    fn set_typing(&self, visible: bool) {
        (**self).set_typing(visible)
    }

    fn evict_oldest(&self) {
        (**self).evict_oldest()
    }

    fn rendered_count(&self) -> usize {
        (**self).rendered_count()
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn toast(&self, toast: &Toast) {
        (**self).toast(toast)
    }
}
