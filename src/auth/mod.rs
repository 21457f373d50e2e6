pub mod flow;
pub mod jwt;
pub mod naver;
pub mod state_store;

pub use flow::{LoginFlow, error_redirect_url, success_redirect_url};
