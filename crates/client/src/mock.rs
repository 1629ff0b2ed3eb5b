use mockall::mock;

use padelup_core::models::account::Session;

use crate::session::SessionStore;

pub use crate::gateway::MockPadelApi;

// Mock session store for testing
mock! {
    pub SessionStore {}

    impl SessionStore for SessionStore {
        fn get(&self) -> Option<Session>;

        fn set(&self, session: Session) -> eyre::Result<()>;

        fn clear(&self) -> eyre::Result<()>;
    }
}
