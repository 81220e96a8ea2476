mod render;
mod state;
mod text_buffer;
mod update;

pub use render::{calculate_input_height, render_input};
pub use state::InputState;
pub use text_buffer::TextBuffer;
pub use update::{InputAction, handle_key, handle_paste};
