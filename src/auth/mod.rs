pub mod authorizer;
pub mod credentials;
pub mod renewal;
pub mod session;

pub use authorizer::authorize;
pub use credentials::{
    CredentialPair, CredentialSnapshot, CredentialStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
pub use renewal::RenewalCoordinator;
pub use session::Session;
