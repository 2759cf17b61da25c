use rusqlite::Connection;
use serde_json::Value;
use std::rc::Rc;
use anyhow::Result;
use crate::config::{Config, DEFAULT_SUBDOMAIN};
use crate::db::DbConnection;
use crate::messenger::{MessageRequest, Messenger};
use crate::services::handlers::local_messenger;

/// What `templateUse` does when a template cannot be restored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePolicy {
    /// Return the raw template
    Fallback,
    /// Fail the request
    Strict,
}

impl RestorePolicy {
    pub fn from_fallback_flag(use_fallback: bool) -> Self {
        if use_fallback {
            RestorePolicy::Fallback
        } else {
            RestorePolicy::Strict
        }
    }
}

/// Process-wide resources, built once at startup and dropped at exit.
///
/// Owns the store connection and the messenger. Operations borrow a
/// [`ServiceContext`] from it via [`AppContext::service`].
pub struct AppContext {
    conn: Rc<Connection>,
    messenger: Box<dyn Messenger>,
    user: Option<String>,
    subdomain: String,
    policy: RestorePolicy,
}

impl AppContext {
    /// Open the configured database and wire up the in-process services
    pub fn open(config: &Config) -> Result<Self> {
        let conn = Rc::new(DbConnection::connect_at(&config.data_location)?);
        let messenger = local_messenger(Rc::clone(&conn));
        Ok(Self::new(conn, Box::new(messenger))
            .with_user(config.user.clone())
            .with_subdomain(&config.subdomain)
            .with_policy(RestorePolicy::from_fallback_flag(config.use_fallback)))
    }

    /// In-memory store with in-process services (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Rc::new(DbConnection::connect_in_memory()?);
        let messenger = local_messenger(Rc::clone(&conn));
        Ok(Self::new(conn, Box::new(messenger)))
    }

    pub fn new(conn: Rc<Connection>, messenger: Box<dyn Messenger>) -> Self {
        Self {
            conn,
            messenger,
            user: None,
            subdomain: DEFAULT_SUBDOMAIN.to_string(),
            policy: RestorePolicy::Fallback,
        }
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    pub fn with_subdomain(mut self, subdomain: &str) -> Self {
        self.subdomain = subdomain.to_string();
        self
    }

    pub fn with_policy(mut self, policy: RestorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Borrowed view handed to each operation
    pub fn service(&self) -> ServiceContext<'_> {
        ServiceContext {
            conn: &self.conn,
            messenger: self.messenger.as_ref(),
            user: self.user.as_deref(),
            subdomain: &self.subdomain,
            policy: self.policy,
        }
    }
}

/// Everything a single operation needs: store, messenger, caller identity
/// and the access scope outgoing calls run under.
#[derive(Clone, Copy)]
pub struct ServiceContext<'a> {
    pub conn: &'a Connection,
    pub messenger: &'a dyn Messenger,
    pub user: Option<&'a str>,
    pub subdomain: &'a str,
    pub policy: RestorePolicy,
}

impl<'a> ServiceContext<'a> {
    /// Send a request under this context's access scope
    pub fn send(&self, request: MessageRequest) -> Result<Value> {
        self.messenger.send(request.with_subdomain(self.subdomain))
    }

    pub fn user_owned(&self) -> Option<String> {
        self.user.map(str::to_string)
    }
}
