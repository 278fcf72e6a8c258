mod files;
mod health;
mod podcast;

pub use files::file_handler;
pub use health::{health_handler, root_handler};
pub use podcast::{generate_audio_handler, generate_podcast_handler, generate_script_handler};
