pub mod connection;
pub mod entity;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::establish_connection;
