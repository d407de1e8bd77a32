pub mod call;
pub mod index;
pub mod poll_reply;
pub mod reply;
pub mod service_worker;
pub mod subscribe;
