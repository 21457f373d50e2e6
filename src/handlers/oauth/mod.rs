mod callback_handler;
mod login_url_handler;

pub use callback_handler::callback_handler;
pub use login_url_handler::login_url_handler;
