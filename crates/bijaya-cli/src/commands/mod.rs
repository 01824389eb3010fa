pub mod add;
pub mod common;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod import;
pub mod info;
pub mod list;
pub mod remote;
pub mod show;
pub mod sync;
