pub mod formatting;
pub mod menu;
pub mod prompts;
pub mod terminal;
pub mod test_mode;

pub use prompts::{action_menu, choice_menu, text_input, ChoiceAnswer, TextAnswer};
