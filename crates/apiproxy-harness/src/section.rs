//! One harness section per callable.

use crate::field::{FieldKind, FieldKindTable};
use crate::input::{FieldError, parse_field};
use crate::invoker::ProxyInvoker;
use apiproxy_client::{DispatchError, InvokeError, ResponsePayload};
use apiproxy_core::ProxyMethodDescriptor;
use apiproxy_extractor::{ParamTag, param_tag, parse_param_tags};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// An editable input bound to one parameter.
#[derive(Debug)]
pub struct Field {
    name: String,
    kind: FieldKind,
    tag: Option<ParamTag>,
    value: Mutex<String>,
}

impl Field {
    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The parameter's `@param` tag, if documented.
    #[must_use]
    pub const fn tag(&self) -> Option<&ParamTag> {
        self.tag.as_ref()
    }

    /// Current text.
    #[must_use]
    pub fn value(&self) -> String {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the text.
    pub fn set_value(&self, value: impl Into<String>) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = value.into();
    }

    fn parse(&self) -> Result<Option<Value>, FieldError> {
        parse_field(&self.name, self.kind, &self.value())
    }
}

/// What a section shows below its inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseView {
    /// Nothing sent yet.
    Idle,
    /// Successful result.
    Success(ResponsePayload),
    /// Non-2xx response.
    ApiFailure {
        /// HTTP status
        status: u16,
        /// Reason phrase
        status_text: String,
        /// Error payload
        data: Value,
    },
    /// No response was received.
    NetworkFailure {
        /// Transport message
        message: String,
    },
    /// The call failed for another reason.
    Failure {
        /// Error message
        message: String,
    },
    /// The input was rejected before sending.
    InvalidInput(FieldError),
}

impl ResponseView {
    /// Returns `true` for any failure, local or remote.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::Idle | Self::Success(_))
    }

    fn from_result(result: Result<ResponsePayload, InvokeError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(e) => {
                if let Some(api) = e.dispatch_error().and_then(DispatchError::api_error) {
                    return Self::ApiFailure {
                        status: api.status,
                        status_text: api.status_text.clone(),
                        data: api.data.clone(),
                    };
                }
                if e.dispatch_error().is_some_and(DispatchError::is_network_error) {
                    return Self::NetworkFailure {
                        message: e.to_string(),
                    };
                }
                Self::Failure {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Result of [`Section::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The call was dispatched and finished.
    Completed(ResponseView),
    /// A field was invalid; nothing was sent and every value is kept.
    Rejected(FieldError),
    /// A call from this section is still in flight.
    Busy,
}

impl SubmitOutcome {
    /// Returns `true` if a call was dispatched.
    #[must_use]
    pub const fn was_dispatched(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Clears the in-flight flag on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Inputs, documentation and last response for one callable.
#[derive(Debug)]
pub struct Section {
    name: String,
    jsdoc: String,
    fields: Vec<Field>,
    in_flight: AtomicBool,
    response: Mutex<ResponseView>,
}

impl Section {
    /// Builds the section for a callable, one field per parameter in order.
    #[must_use]
    pub fn new(descriptor: &ProxyMethodDescriptor, table: &FieldKindTable) -> Self {
        let tags = parse_param_tags(&descriptor.jsdoc);
        let fields = descriptor
            .params
            .iter()
            .map(|param| {
                let tag = param_tag(&tags, param).cloned();
                Field {
                    name: param.clone(),
                    kind: table.classify(param, tag.as_ref()),
                    value: Mutex::new(table.initial_value(param)),
                    tag,
                }
            })
            .collect();

        Self {
            name: descriptor.name.clone(),
            jsdoc: descriptor.jsdoc.clone(),
            fields,
            in_flight: AtomicBool::new(false),
            response: Mutex::new(ResponseView::Idle),
        }
    }

    /// Callable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documentation text.
    #[must_use]
    pub fn jsdoc(&self) -> &str {
        &self.jsdoc
    }

    /// Fields in parameter order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by parameter name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if the callable takes no parameters.
    #[must_use]
    pub fn has_no_params(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` while a submitted call is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Last response shown by this section.
    #[must_use]
    pub fn response(&self) -> ResponseView {
        self.response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Collects the arguments in parameter order.
    ///
    /// Trailing absent values are dropped; an absent value followed by a
    /// present one is sent as `null`.
    ///
    /// # Errors
    ///
    /// Returns the first field error.
    pub fn collect_args(&self) -> Result<Vec<Value>, FieldError> {
        let mut values = self
            .fields
            .iter()
            .map(Field::parse)
            .collect::<Result<Vec<_>, _>>()?;
        while values.last().is_some_and(Option::is_none) {
            values.pop();
        }
        Ok(values
            .into_iter()
            .map(|v| v.unwrap_or(Value::Null))
            .collect())
    }

    /// Validates the inputs and calls the callable.
    ///
    /// Refused with [`SubmitOutcome::Busy`] while a previous call from this
    /// section is running. The busy flag is released when the call finishes,
    /// whatever its result.
    pub async fn submit<I: ProxyInvoker + ?Sized>(&self, invoker: &I) -> SubmitOutcome {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!(callable = %self.name, "submit refused: call in flight");
            return SubmitOutcome::Busy;
        };

        let args = match self.collect_args() {
            Ok(args) => args,
            Err(e) => {
                tracing::debug!(callable = %self.name, error = %e, "submit rejected");
                self.set_response(ResponseView::InvalidInput(e.clone()));
                return SubmitOutcome::Rejected(e);
            }
        };

        tracing::debug!(callable = %self.name, args = args.len(), "invoking");
        let view = ResponseView::from_result(invoker.invoke(&self.name, args).await);
        self.set_response(view.clone());
        SubmitOutcome::Completed(view)
    }

    fn set_response(&self, view: ResponseView) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::MockProxyInvoker;
    use apiproxy_client::ApiError;
    use serde_json::json;

    fn section(name: &str, jsdoc: &str, params: &[&str]) -> Section {
        let descriptor = ProxyMethodDescriptor::new(
            name,
            jsdoc,
            params.iter().map(ToString::to_string).collect(),
        );
        Section::new(&descriptor, &FieldKindTable::default())
    }

    #[test]
    fn test_fields_follow_params() {
        let s = section(
            "create",
            "@param {object} payload - Request body.",
            &["payload"],
        );
        assert_eq!(s.fields().len(), 1);
        assert_eq!(s.fields()[0].kind(), FieldKind::Structured);
        assert_eq!(s.fields()[0].tag().unwrap().type_expr, "object");
    }

    #[test]
    fn test_zero_param_section() {
        let s = section("fetch", "", &[]);
        assert!(s.has_no_params());
        assert_eq!(s.collect_args().unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn test_message_field_is_prefilled() {
        let s = section("reversemsg", "", &["message"]);
        assert_eq!(s.field("message").unwrap().value(), r#"{"message": "Hello"}"#);
    }

    #[test]
    fn test_trailing_absent_args_are_dropped() {
        let s = section("create", "", &["data"]);
        assert_eq!(s.collect_args().unwrap(), Vec::<Value>::new());
        s.field("data").unwrap().set_value("{}");
        assert_eq!(s.collect_args().unwrap(), vec![json!({})]);
    }

    #[tokio::test]
    async fn test_echo_submission() {
        let s = section("echomsg", "@param {string} msg - Path segment :msg.", &["msg"]);
        s.field("msg").unwrap().set_value("hi");

        let mut invoker = MockProxyInvoker::new();
        invoker
            .expect_invoke()
            .withf(|name, args| name == "echomsg" && *args == vec![json!("hi")])
            .times(1)
            .returning(|_, _| {
                Ok(ResponsePayload::Json(json!({"received": "hi", "echoed": "hi"})))
            });

        let outcome = s.submit(&invoker).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Completed(ResponseView::Success(ResponsePayload::Json(
                json!({"received": "hi", "echoed": "hi"})
            )))
        );
        assert!(!s.is_busy());
    }

    #[tokio::test]
    async fn test_invalid_json_is_not_dispatched() {
        let s = section("create", "", &["data"]);
        s.field("data").unwrap().set_value("not-json-{");

        let mut invoker = MockProxyInvoker::new();
        invoker.expect_invoke().never();

        let outcome = s.submit(&invoker).await;
        assert!(matches!(outcome, SubmitOutcome::Rejected(ref e) if e.field() == "data"));
        assert_eq!(s.field("data").unwrap().value(), "not-json-{");
        assert!(s.response().is_error());
        assert!(!s.is_busy());
    }

    #[tokio::test]
    async fn test_api_failure_view() {
        let s = section("echomsg", "", &["msg"]);

        let mut invoker = MockProxyInvoker::new();
        invoker.expect_invoke().returning(|_, _| {
            Err(InvokeError::Dispatch(DispatchError::Api(ApiError {
                status: 401,
                status_text: "Unauthorized".to_string(),
                data: json!({"message": "Access token is missing"}),
            })))
        });

        let outcome = s.submit(&invoker).await;
        let SubmitOutcome::Completed(ResponseView::ApiFailure { status, data, .. }) = outcome
        else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(status, 401);
        assert_eq!(data["message"], "Access token is missing");
    }

    #[tokio::test]
    async fn test_busy_section_refuses_submit() {
        let s = section("fetch", "", &[]);
        let guard = InFlight::acquire(&s.in_flight).unwrap();

        let mut invoker = MockProxyInvoker::new();
        invoker.expect_invoke().never();
        assert_eq!(s.submit(&invoker).await, SubmitOutcome::Busy);

        drop(guard);
        assert!(!s.is_busy());
    }
}
