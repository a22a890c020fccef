pub mod code_fence;
pub mod config;
pub mod front_matter;
pub mod lint;
pub mod logger;
pub mod new_post;
pub mod post;
pub mod post_list;
pub mod post_render;
pub mod taxonomy;
pub mod text_utils;
pub mod util;
mod test_data;
