//! Digit-pad composition of the answer buffer. The session stores whatever
//! text it is handed; this module decides what that text is.

use crate::session::SessionController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKey {
    Digit(u8),
    Backspace,
    Clear,
}

impl PadKey {
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| PadKey::Digit(d as u8))
    }
}

/// After a jump to another question the preloaded answer is shown, and the
/// first digit typed replaces it rather than extending it.
#[derive(Debug, Default, Clone)]
pub struct AnswerPad {
    replace_next: bool,
}

impl AnswerPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_navigated(&mut self) {
        self.replace_next = true;
    }

    pub fn reset(&mut self) {
        self.replace_next = false;
    }

    pub fn replaces_next(&self) -> bool {
        self.replace_next
    }

    pub fn compose(&mut self, current: &str, key: PadKey) -> String {
        let replace = std::mem::take(&mut self.replace_next);
        match key {
            PadKey::Digit(d) => {
                let digit = char::from(b'0' + d.min(9));
                if replace {
                    digit.to_string()
                } else {
                    let mut next = current.to_string();
                    next.push(digit);
                    next
                }
            }
            PadKey::Backspace => {
                let mut next = current.to_string();
                next.pop();
                next
            }
            PadKey::Clear => String::new(),
        }
    }
}

pub fn apply_key(controller: &mut SessionController, pad: &mut AnswerPad, key: PadKey) {
    if !controller.is_running() {
        return;
    }
    let next = pad.compose(controller.input_buffer(), key);
    controller.set_input_buffer(next);
}

pub fn submit(controller: &mut SessionController, pad: &mut AnswerPad) {
    pad.reset();
    controller.commit_and_advance();
}

pub fn navigate(controller: &mut SessionController, pad: &mut AnswerPad, index: usize) {
    let before = controller.current_index();
    controller.navigate_to(index);
    if controller.is_running() && controller.current_index() != before {
        pad.mark_navigated();
    }
}
