//! Inter-service calls.
//!
//! Sibling services (the template store, the sales domain, the core field
//! group registry) never call each other's functions directly. They exchange
//! a [`MessageRequest`] through a [`Messenger`], naming the target service,
//! the module and action to run and a JSON input payload.
//!
//! [`LocalMessenger`] routes requests to handlers registered in the same
//! process. A deployment that splits services across processes only needs
//! another `Messenger` implementation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use anyhow::Result;
use crate::error::SalesError;

/// Whether a call reads or writes on the target side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Query,
    Mutation,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Query => "query",
            Method::Mutation => "mutation",
        }
    }
}

/// A named call to a sibling service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub plugin_name: String,
    /// Access scope the call runs under
    pub subdomain: String,
    pub method: Method,
    pub module: String,
    pub action: String,
    pub input: Value,
    /// Returned in place of a null result
    pub default_value: Option<Value>,
}

impl MessageRequest {
    pub fn new(plugin_name: &str, method: Method, module: &str, action: &str) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            subdomain: String::new(),
            method,
            module: module.to_string(),
            action: action.to_string(),
            input: Value::Null,
            default_value: None,
        }
    }

    pub fn query(plugin_name: &str, module: &str, action: &str) -> Self {
        Self::new(plugin_name, Method::Query, module, action)
    }

    pub fn mutation(plugin_name: &str, module: &str, action: &str) -> Self {
        Self::new(plugin_name, Method::Mutation, module, action)
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    pub fn with_default(mut self, default_value: Value) -> Self {
        self.default_value = Some(default_value);
        self
    }

    pub fn with_subdomain(mut self, subdomain: &str) -> Self {
        self.subdomain = subdomain.to_string();
        self
    }

    /// `module.action`, used for routing and log lines
    pub fn route(&self) -> String {
        format!("{}.{}", self.module, self.action)
    }

    fn downstream_error(&self) -> SalesError {
        SalesError::Downstream {
            service: self.plugin_name.clone(),
            module: self.module.clone(),
            action: self.action.clone(),
        }
    }
}

/// Sends requests to sibling services
pub trait Messenger {
    /// Deliver a request and return the target's JSON result.
    ///
    /// A null result is replaced by the request's default value when one is
    /// set. Failures on the target side come back as
    /// [`SalesError::Downstream`] wrapping the cause.
    fn send(&self, request: MessageRequest) -> Result<Value>;
}

/// Service end of a message exchange
pub trait ServiceHandler {
    /// Run one request. `messenger` lets the handler make nested calls.
    fn handle(&self, request: &MessageRequest, messenger: &dyn Messenger) -> Result<Value>;
}

/// In-process messenger routing by target service name
#[derive(Default)]
pub struct LocalMessenger {
    services: HashMap<String, Box<dyn ServiceHandler>>,
}

impl LocalMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for a service name
    pub fn register(&mut self, name: &str, handler: Box<dyn ServiceHandler>) {
        self.services.insert(name.to_string(), handler);
    }

    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}

impl Messenger for LocalMessenger {
    fn send(&self, request: MessageRequest) -> Result<Value> {
        log::debug!(
            "{} {} -> {} [{}]",
            request.method.as_str(),
            request.route(),
            request.plugin_name,
            request.subdomain
        );

        let handler = self.services.get(&request.plugin_name).ok_or_else(|| {
            anyhow::Error::msg(format!("Service '{}' is not available", request.plugin_name))
                .context(request.downstream_error())
        })?;

        let value = handler
            .handle(&request, self)
            .map_err(|e| e.context(request.downstream_error()))?;

        if value.is_null() {
            if let Some(default_value) = request.default_value {
                return Ok(default_value);
            }
        }

        Ok(value)
    }
}

/// Reject a request naming an action the handler does not know
pub fn unknown_action(request: &MessageRequest) -> anyhow::Error {
    anyhow::anyhow!(
        "Service '{}' has no {} action {}",
        request.plugin_name,
        request.method.as_str(),
        request.route()
    )
}
