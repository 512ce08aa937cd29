//! Placeholder replies used when the backend is unreachable or errors.
//!
//! Selection is random in production. Tests inject [`FixedFallback`] so they
//! can assert on exact text.

use rand::Rng;

/// Number of fallback templates.
pub const FALLBACK_TEMPLATE_COUNT: usize = 4;

/// Picks which fallback template to use.
pub trait FallbackSelector: Send + Sync {
    /// Return an index in `0..count`.
    fn choose(&self, count: usize) -> usize;
}

/// Uniformly random selection.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomFallback;

impl FallbackSelector for RandomFallback {
    fn choose(&self, count: usize) -> usize {
        rand::thread_rng().gen_range(0..count.max(1))
    }
}

/// Always the same template (clamped to the available range).
#[derive(Debug, Clone, Copy)]
pub struct FixedFallback(pub usize);

impl FallbackSelector for FixedFallback {
    fn choose(&self, count: usize) -> usize {
        self.0.min(count.saturating_sub(1))
    }
}

/// All fallback replies for `message`, each embedding the original text.
pub fn fallback_templates(message: &str) -> [String; FALLBACK_TEMPLATE_COUNT] {
    [
        format!("I'm currently running in offline mode. Your message has been received: {message}"),
        format!("API connection unavailable. Here's a simulated response to: {message}"),
        format!(
            "I understand you said: {message}. However, I'm not connected to the backend right now."
        ),
        format!(
            "Your message '{message}' has been noted. Please check the API connection in settings."
        ),
    ]
}

/// Build the fallback reply for `message` using `selector`.
pub fn fallback_reply(selector: &dyn FallbackSelector, message: &str) -> String {
    let templates = fallback_templates(message);
    let index = selector.choose(templates.len());
    templates[index.min(templates.len() - 1)].clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_embeds_message() {
        for reply in fallback_templates("where is my order") {
            assert!(reply.contains("where is my order"));
        }
    }

    #[test]
    fn test_fixed_selector_is_deterministic() {
        let reply = fallback_reply(&FixedFallback(1), "ping");
        assert_eq!(reply, "API connection unavailable. Here's a simulated response to: ping");
    }

    #[test]
    fn test_fixed_selector_clamps_out_of_range() {
        let reply = fallback_reply(&FixedFallback(99), "ping");
        assert!(reply.starts_with("Your message 'ping'"));
    }

    #[test]
    fn test_random_selector_stays_in_range() {
        let selector = RandomFallback;
        for _ in 0..200 {
            assert!(selector.choose(FALLBACK_TEMPLATE_COUNT) < FALLBACK_TEMPLATE_COUNT);
        }
    }
}
