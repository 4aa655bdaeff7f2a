//! Per-kind bindings between the pure core and the remote client.
//!
//! Each [`ResourceType`] names the desired, state, remote and request types
//! of one kind and wires them to its validator, builders, materializer and
//! backend calls. [`crate::Reconciler`] is generic over it.

use crate::config::{ContactConfig, MonitorConfig, StatusPageConfig};
use crate::error::Result;
use crate::materialize::{materialize_contact, materialize_monitor, materialize_status_page};
use crate::request::{
    ContactDelta, MonitorDelta, StatusPageDelta, build_contact_create, build_contact_update,
    build_monitor_create, build_monitor_update, build_status_page_create,
    build_status_page_update,
};
use crate::state::{ContactState, MonitorState, StatusPageState};
use crate::types::ResourceKind;
use crate::validate::{ValidationIssue, validate_contact, validate_monitor, validate_status_page};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use uptimekit::{
    Backend, Contact, CreateContactRequest, CreateMonitorRequest, CreateStatusPageRequest,
    Monitor, StatusPage,
};

/// A partial update.
pub trait UpdateDelta: fmt::Debug + Clone + PartialEq + Send + Sync {
    /// Names of the fields the delta touches.
    fn changed_fields(&self) -> Vec<&'static str>;

    fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}

impl UpdateDelta for MonitorDelta {
    fn changed_fields(&self) -> Vec<&'static str> {
        Self::changed_fields(self)
    }
}

impl UpdateDelta for ContactDelta {
    fn changed_fields(&self) -> Vec<&'static str> {
        Self::changed_fields(self)
    }
}

impl UpdateDelta for StatusPageDelta {
    fn changed_fields(&self) -> Vec<&'static str> {
        Self::changed_fields(self)
    }
}

/// One managed resource kind.
pub trait ResourceType: Send + Sync + 'static {
    const KIND: ResourceKind;

    type Desired: fmt::Debug + Clone + Send + Sync;
    type State: fmt::Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    type Remote;
    type CreateRequest: fmt::Debug;
    type Delta: UpdateDelta;

    fn validate(desired: &Self::Desired) -> Vec<ValidationIssue>;
    fn build_create(desired: &Self::Desired) -> Result<Self::CreateRequest>;
    fn build_update(desired: &Self::Desired, prior: &Self::State) -> Result<Self::Delta>;
    fn materialize(remote: &Self::Remote) -> Result<Self::State>;

    /// Server-assigned id of a materialized resource.
    fn id(state: &Self::State) -> &str;
    /// Display name of a materialized resource.
    fn name(state: &Self::State) -> &str;

    /// Note values the service adjusted on write.
    fn observe_adjustments(_desired: &Self::Desired, _state: &mut Self::State) {}

    /// Keep client-side bookkeeping from `prior` on a freshly read state.
    fn carry_over(_prior: &Self::State, _fresh: &mut Self::State) {}

    fn remote_create(backend: &dyn Backend, request: &Self::CreateRequest) -> uptimekit::Result<Self::Remote>;
    fn remote_get(backend: &dyn Backend, id: &str) -> uptimekit::Result<Option<Self::Remote>>;
    fn remote_update(backend: &dyn Backend, id: &str, delta: Self::Delta) -> uptimekit::Result<Self::Remote>;
    fn remote_delete(backend: &dyn Backend, id: &str) -> uptimekit::Result<()>;
    fn remote_list(backend: &dyn Backend) -> uptimekit::Result<Vec<Self::Remote>>;
}

/// Uptime monitors.
#[derive(Debug, Clone, Copy)]
pub struct MonitorResource;

impl ResourceType for MonitorResource {
    const KIND: ResourceKind = ResourceKind::Monitor;

    type Desired = MonitorConfig;
    type State = MonitorState;
    type Remote = Monitor;
    type CreateRequest = CreateMonitorRequest;
    type Delta = MonitorDelta;

    fn validate(desired: &MonitorConfig) -> Vec<ValidationIssue> {
        validate_monitor(desired)
    }

    fn build_create(desired: &MonitorConfig) -> Result<CreateMonitorRequest> {
        build_monitor_create(desired)
    }

    fn build_update(desired: &MonitorConfig, prior: &MonitorState) -> Result<MonitorDelta> {
        build_monitor_update(desired, prior)
    }

    fn materialize(remote: &Monitor) -> Result<MonitorState> {
        materialize_monitor(remote)
    }

    fn id(state: &MonitorState) -> &str {
        &state.id
    }

    fn name(state: &MonitorState) -> &str {
        &state.name
    }

    fn observe_adjustments(desired: &MonitorConfig, state: &mut MonitorState) {
        let requested = desired.effective_fail_threshold();
        if state.fail_threshold == requested {
            state.requested_fail_threshold = None;
            return;
        }
        log::warn!(
            "Monitor '{}' ({}): fail_threshold {} adjusted by the service to {}",
            state.name,
            state.id,
            requested,
            state.fail_threshold
        );
        state.requested_fail_threshold = Some(requested);
    }

    fn carry_over(prior: &MonitorState, fresh: &mut MonitorState) {
        if fresh.fail_threshold == prior.fail_threshold {
            fresh.requested_fail_threshold = prior.requested_fail_threshold;
        }
    }

    fn remote_create(backend: &dyn Backend, request: &CreateMonitorRequest) -> uptimekit::Result<Monitor> {
        backend.create_monitor(request)
    }

    fn remote_get(backend: &dyn Backend, id: &str) -> uptimekit::Result<Option<Monitor>> {
        backend.get_monitor(id)
    }

    fn remote_update(backend: &dyn Backend, id: &str, delta: MonitorDelta) -> uptimekit::Result<Monitor> {
        backend.update_monitor(id, &delta.into_request())
    }

    fn remote_delete(backend: &dyn Backend, id: &str) -> uptimekit::Result<()> {
        backend.delete_monitor(id)
    }

    fn remote_list(backend: &dyn Backend) -> uptimekit::Result<Vec<Monitor>> {
        backend.list_monitors()
    }
}

/// Notification contacts.
#[derive(Debug, Clone, Copy)]
pub struct ContactResource;

impl ResourceType for ContactResource {
    const KIND: ResourceKind = ResourceKind::Contact;

    type Desired = ContactConfig;
    type State = ContactState;
    type Remote = Contact;
    type CreateRequest = CreateContactRequest;
    type Delta = ContactDelta;

    fn validate(desired: &ContactConfig) -> Vec<ValidationIssue> {
        validate_contact(desired)
    }

    fn build_create(desired: &ContactConfig) -> Result<CreateContactRequest> {
        build_contact_create(desired)
    }

    fn build_update(desired: &ContactConfig, prior: &ContactState) -> Result<ContactDelta> {
        build_contact_update(desired, prior)
    }

    fn materialize(remote: &Contact) -> Result<ContactState> {
        materialize_contact(remote)
    }

    fn id(state: &ContactState) -> &str {
        &state.id
    }

    fn name(state: &ContactState) -> &str {
        &state.name
    }

    fn remote_create(backend: &dyn Backend, request: &CreateContactRequest) -> uptimekit::Result<Contact> {
        backend.create_contact(request)
    }

    fn remote_get(backend: &dyn Backend, id: &str) -> uptimekit::Result<Option<Contact>> {
        backend.get_contact(id)
    }

    fn remote_update(backend: &dyn Backend, id: &str, delta: ContactDelta) -> uptimekit::Result<Contact> {
        backend.update_contact(id, &delta.into_request())
    }

    fn remote_delete(backend: &dyn Backend, id: &str) -> uptimekit::Result<()> {
        backend.delete_contact(id)
    }

    fn remote_list(backend: &dyn Backend) -> uptimekit::Result<Vec<Contact>> {
        backend.list_contacts()
    }
}

/// Public status pages.
#[derive(Debug, Clone, Copy)]
pub struct StatusPageResource;

impl ResourceType for StatusPageResource {
    const KIND: ResourceKind = ResourceKind::StatusPage;

    type Desired = StatusPageConfig;
    type State = StatusPageState;
    type Remote = StatusPage;
    type CreateRequest = CreateStatusPageRequest;
    type Delta = StatusPageDelta;

    fn validate(desired: &StatusPageConfig) -> Vec<ValidationIssue> {
        validate_status_page(desired)
    }

    fn build_create(desired: &StatusPageConfig) -> Result<CreateStatusPageRequest> {
        Ok(build_status_page_create(desired))
    }

    fn build_update(desired: &StatusPageConfig, prior: &StatusPageState) -> Result<StatusPageDelta> {
        Ok(build_status_page_update(desired, prior))
    }

    fn materialize(remote: &StatusPage) -> Result<StatusPageState> {
        Ok(materialize_status_page(remote))
    }

    fn id(state: &StatusPageState) -> &str {
        &state.id
    }

    fn name(state: &StatusPageState) -> &str {
        &state.name
    }

    fn remote_create(
        backend: &dyn Backend,
        request: &CreateStatusPageRequest,
    ) -> uptimekit::Result<StatusPage> {
        backend.create_status_page(request)
    }

    fn remote_get(backend: &dyn Backend, id: &str) -> uptimekit::Result<Option<StatusPage>> {
        backend.get_status_page(id)
    }

    fn remote_update(
        backend: &dyn Backend,
        id: &str,
        delta: StatusPageDelta,
    ) -> uptimekit::Result<StatusPage> {
        backend.update_status_page(id, &delta.into_request())
    }

    fn remote_delete(backend: &dyn Backend, id: &str) -> uptimekit::Result<()> {
        backend.delete_status_page(id)
    }

    fn remote_list(backend: &dyn Backend) -> uptimekit::Result<Vec<StatusPage>> {
        backend.list_status_pages()
    }
}
