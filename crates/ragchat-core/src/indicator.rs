//! Animated "thinking" placeholder shown while a question is in flight.

/// Non-breaking space. An empty placeholder would collapse and make the
/// transcript's scroll position jump, so this stands in for zero dots.
pub const NBSP: &str = "\u{00A0}";

const FRAMES: u8 = 4;

/// Ellipsis that cycles through zero to three dots, one step per tick.
///
/// The indicator only advances when the front end calls [`tick`]. It is
/// owned by the pending request and torn down by dropping it.
///
/// [`tick`]: PendingIndicator::tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingIndicator {
    counter: u8,
    text: String,
}

impl Default for PendingIndicator {
    fn default() -> Self {
        Self::start()
    }
}

impl PendingIndicator {
    pub fn start() -> Self {
        Self {
            counter: 0,
            text: NBSP.to_string(),
        }
    }

    pub fn tick(&mut self) {
        self.text = ". ".repeat(self.counter as usize);
        if self.text.is_empty() {
            self.text = NBSP.to_string();
        }
        self.counter = (self.counter + 1) % FRAMES;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of dots currently shown
    pub fn dots(&self) -> usize {
        self.text.matches('.').count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_nbsp() {
        assert_eq!(PendingIndicator::start().text(), NBSP);
    }

    #[test]
    fn test_cycles_through_frames() {
        let mut indicator = PendingIndicator::start();
        let mut seen = Vec::new();
        for _ in 0..8 {
            indicator.tick();
            seen.push(indicator.text().to_string());
        }
        assert_eq!(
            seen,
            vec![NBSP, ". ", ". . ", ". . . ", NBSP, ". ", ". . ", ". . . "]
        );
    }

    #[test]
    fn test_never_renders_empty() {
        let mut indicator = PendingIndicator::start();
        for _ in 0..100 {
            assert!(!indicator.text().is_empty());
            assert!(!indicator.text().trim_matches(' ').is_empty());
            indicator.tick();
        }
    }

    #[test]
    fn test_dot_count() {
        let mut indicator = PendingIndicator::start();
        assert_eq!(indicator.dots(), 0);
        indicator.tick();
        indicator.tick();
        indicator.tick();
        assert_eq!(indicator.dots(), 2);
    }
}
