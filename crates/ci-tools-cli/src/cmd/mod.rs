pub mod detect_images;
pub mod markdown_index;
pub mod wait;
