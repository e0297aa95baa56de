//! The seam between harness sections and the executable proxy.

use apiproxy_client::{InvokeError, ProxyModule, ResponsePayload};
use async_trait::async_trait;
use serde_json::Value;

/// Calls proxy callables by name and reports session state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProxyInvoker: Send + Sync {
    /// Calls `name` with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns the proxy's invocation error unchanged.
    async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<ResponsePayload, InvokeError>;

    /// Returns `true` if the session currently holds a token.
    fn is_authenticated(&self) -> bool;
}

#[async_trait]
impl ProxyInvoker for ProxyModule {
    async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<ResponsePayload, InvokeError> {
        Self::invoke(self, name, args).await
    }

    fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }
}
