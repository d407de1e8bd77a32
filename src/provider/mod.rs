pub use self::http::HTTP;

#[cfg(test)]
pub(crate) use self::http::tests::accept_push;

mod http;
