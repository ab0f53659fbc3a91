use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    /// The configured backend couldn't be set up.
    #[display("storage error")]
    Storage,
    /// The configured storage kind was compiled out.
    #[display("storage kind \"{_0}\" is not enabled in this build")]
    UnsupportedStorage(#[error(not(source))] &'static str),
    #[display("lookup failed")]
    Lookup,
    #[display("unable to write output")]
    Output,
}
