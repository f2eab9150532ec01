//! Domain models for edge-service.

mod access;
mod action;
mod peer;
mod topology;

pub use access::{RequestContext, RoleAction, UserAction, UserOrgMembership};
pub use action::{Action, UnknownAction};
pub use peer::{ExitNodeConfig, PeerConfig};
pub use topology::{CreateResource, CreateSite, ExitNode, Resource, Site, Target, UpdateResource};
