pub mod handlers;
pub mod pages;

pub use handlers::{ApiState, create_api_router};
pub use pages::load_templates;
