pub mod app_state_builder;
pub mod fixtures;
pub mod in_memory_content;
pub mod in_memory_users;
pub mod stubs;
