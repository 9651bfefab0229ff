use std::ops::Deref;
use unicode_width::UnicodeWidthStr;

use tui_input::{Input, InputRequest};

/// The filter query as typed by the user, shown behind a prompt.
///
/// Editing is append-only: characters go to the end and backspace removes
/// the last one.
pub(crate) struct InputBuffer {
    pub(crate) input: Input,
    pub(crate) prompt: String,
}

impl Deref for InputBuffer {
    type Target = Input;

    fn deref(&self) -> &Self::Target {
        &self.input
    }
}

impl InputBuffer {
    pub fn new(prompt: String) -> Self {
        Self {
            input: Input::default(),
            prompt,
        }
    }

    pub(crate) fn push(&mut self, c: char) {
        self.input.handle(InputRequest::GoToEnd);
        self.input.handle(InputRequest::InsertChar(c));
    }

    /// Returns `false` when there was nothing to delete.
    pub(crate) fn pop(&mut self) -> bool {
        if self.input.value().is_empty() {
            return false;
        }
        self.input.handle(InputRequest::GoToEnd);
        self.input.handle(InputRequest::DeletePrevChar);
        true
    }

    pub(crate) fn clear(&mut self) {
        self.input.reset();
    }

    pub(crate) fn display(&self) -> String {
        self.prompt.clone() + self.input.value()
    }

    pub(crate) fn visual_cursor(&self) -> usize {
        UnicodeWidthStr::width(self.prompt.as_str()) + self.input.visual_cursor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_pop_edit_the_tail() {
        let mut buffer = InputBuffer::new("/".to_string());
        for c in "web1".chars() {
            buffer.push(c);
        }
        assert_eq!(buffer.value(), "web1");
        assert!(buffer.pop());
        assert_eq!(buffer.value(), "web");
        assert_eq!(buffer.display(), "/web");
        assert_eq!(buffer.visual_cursor(), 4);
    }

    #[test]
    fn pop_on_empty_is_a_noop() {
        let mut buffer = InputBuffer::new(String::new());
        assert!(!buffer.pop());
        assert_eq!(buffer.value(), "");
    }

    #[test]
    fn clear_empties_the_query() {
        let mut buffer = InputBuffer::new(String::new());
        buffer.push('x');
        buffer.clear();
        assert_eq!(buffer.value(), "");
    }
}
