pub mod send_push;
pub mod upload;
