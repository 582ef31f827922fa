//! Resource command routing.
//!
//! Maps a resource type and action to an HTTP method, URL path and the set
//! of arguments the action accepts. All validation happens here, before any
//! network call is made.

use reqwest::Method;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::params::ListModifiers;

#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    #[error("action '{action}' is not supported for '{resource}'")]
    UnsupportedAction { resource: String, action: String },
    #[error("action '{0}' requires --id")]
    MissingIdentifier(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// The API object categories exposed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Allocations,
    Images,
    ImageProperties,
    Iterations,
    Requests,
    ResourceGroups,
    ResourceToGroup,
    Resources,
    Users,
}

impl Resource {
    /// The URL path segment for this resource.
    pub fn path(&self) -> String {
        self.to_string()
    }
}

/// Operations that can be performed against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Create,
    Get,
    List,
    Query,
    Update,
    Delete,
    Approve,
    Decline,
}

/// Resolved request shape for a resource/action pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTemplate {
    pub method: Method,
    pub resource: Resource,
    pub action: Action,
    pub requires_id: bool,
    pub allows_modifiers: bool,
    pub allows_data: bool,
    /// Extra path segment appended after the id (approve/decline).
    pub suffix: Option<&'static str>,
}

/// Resolve a resource/action pair into a request template.
///
/// Unsupported combinations fail here; approve and decline only exist for
/// allocation requests.
pub fn resolve(resource: Resource, action: Action) -> Result<RequestTemplate, RouteError> {
    let template = match action {
        Action::Create => RequestTemplate {
            method: Method::POST,
            resource,
            action,
            requires_id: false,
            allows_modifiers: false,
            allows_data: true,
            suffix: None,
        },
        Action::Get => RequestTemplate {
            method: Method::GET,
            resource,
            action,
            requires_id: true,
            allows_modifiers: false,
            allows_data: false,
            suffix: None,
        },
        Action::List => RequestTemplate {
            method: Method::GET,
            resource,
            action,
            requires_id: false,
            allows_modifiers: true,
            allows_data: false,
            suffix: None,
        },
        Action::Query => RequestTemplate {
            method: Method::GET,
            resource,
            action,
            requires_id: false,
            allows_modifiers: true,
            allows_data: true,
            suffix: None,
        },
        Action::Update => RequestTemplate {
            method: Method::PUT,
            resource,
            action,
            requires_id: true,
            allows_modifiers: false,
            allows_data: true,
            suffix: None,
        },
        Action::Delete => RequestTemplate {
            method: Method::DELETE,
            resource,
            action,
            requires_id: true,
            allows_modifiers: false,
            allows_data: false,
            suffix: None,
        },
        Action::Approve => decision_template(resource, action, "approve")?,
        Action::Decline => decision_template(resource, action, "decline")?,
    };

    Ok(template)
}

/// Approve and decline exist only for allocation requests and post to a
/// subpath under the item.
fn decision_template(
    resource: Resource,
    action: Action,
    suffix: &'static str,
) -> Result<RequestTemplate, RouteError> {
    if resource != Resource::Requests {
        return Err(RouteError::UnsupportedAction {
            resource: resource.to_string(),
            action: action.to_string(),
        });
    }

    Ok(RequestTemplate {
        method: Method::POST,
        resource,
        action,
        requires_id: true,
        allows_modifiers: false,
        allows_data: false,
        suffix: Some(suffix),
    })
}

/// Validate the supplied id, modifiers and data pairs against a template.
pub fn validate_invocation(
    template: &RequestTemplate,
    id: Option<i64>,
    modifiers: &ListModifiers,
    has_data: bool,
) -> Result<(), RouteError> {
    if template.requires_id && id.is_none() {
        return Err(RouteError::MissingIdentifier(template.action.to_string()));
    }
    if !template.requires_id && id.is_some() {
        return Err(RouteError::InvalidArgument(format!(
            "--id is not accepted by '{}'",
            template.action
        )));
    }
    if !template.allows_modifiers && !modifiers.is_empty() {
        return Err(RouteError::InvalidArgument(format!(
            "limit, offset and order-by are not accepted by '{}'",
            template.action
        )));
    }
    if !template.allows_data && has_data {
        return Err(RouteError::InvalidArgument(format!(
            "KEY=VALUE arguments are not accepted by '{}'",
            template.action
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_crud_methods_for_all_resources() {
        for resource in Resource::iter() {
            assert_eq!(resolve(resource, Action::Create).unwrap().method, Method::POST);
            assert_eq!(resolve(resource, Action::Get).unwrap().method, Method::GET);
            assert_eq!(resolve(resource, Action::List).unwrap().method, Method::GET);
            assert_eq!(resolve(resource, Action::Query).unwrap().method, Method::GET);
            assert_eq!(resolve(resource, Action::Update).unwrap().method, Method::PUT);
            assert_eq!(
                resolve(resource, Action::Delete).unwrap().method,
                Method::DELETE
            );
        }
    }

    #[test]
    fn test_approve_only_on_requests() {
        for resource in Resource::iter() {
            for action in [Action::Approve, Action::Decline] {
                let result = resolve(resource, action);
                if resource == Resource::Requests {
                    let template = result.unwrap();
                    assert_eq!(template.method, Method::POST);
                    assert!(template.requires_id);
                    let expected_suffix = match action {
                        Action::Approve => "approve",
                        _ => "decline",
                    };
                    assert_eq!(template.suffix, Some(expected_suffix));
                } else {
                    assert_eq!(
                        result.unwrap_err(),
                        RouteError::UnsupportedAction {
                            resource: resource.to_string(),
                            action: action.to_string(),
                        }
                    );
                }
            }
        }
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(Resource::Resources.path(), "resources");
        assert_eq!(Resource::ResourceToGroup.path(), "resource_to_group");
        assert_eq!(Resource::ImageProperties.path(), "image_properties");
    }

    #[test]
    fn test_resource_parse_from_name() {
        use std::str::FromStr;
        assert_eq!(
            Resource::from_str("resource_groups").unwrap(),
            Resource::ResourceGroups
        );
        assert!(Resource::from_str("bogus").is_err());
    }

    #[test]
    fn test_missing_identifier() {
        let template = resolve(Resource::Resources, Action::Delete).unwrap();
        let err =
            validate_invocation(&template, None, &ListModifiers::default(), false).unwrap_err();
        assert_eq!(err, RouteError::MissingIdentifier("delete".to_string()));
    }

    #[test]
    fn test_modifiers_rejected_outside_list_and_query() {
        let template = resolve(Resource::Resources, Action::Create).unwrap();
        let modifiers = ListModifiers {
            limit: Some(10),
            ..Default::default()
        };
        let err = validate_invocation(&template, None, &modifiers, false).unwrap_err();
        assert!(matches!(err, RouteError::InvalidArgument(_)));
    }

    #[test]
    fn test_unexpected_id_rejected() {
        let template = resolve(Resource::Resources, Action::List).unwrap();
        let err =
            validate_invocation(&template, Some(1), &ListModifiers::default(), false).unwrap_err();
        assert!(matches!(err, RouteError::InvalidArgument(_)));
    }

    #[test]
    fn test_data_rejected_on_get() {
        let template = resolve(Resource::Users, Action::Get).unwrap();
        let err =
            validate_invocation(&template, Some(1), &ListModifiers::default(), true).unwrap_err();
        assert!(matches!(err, RouteError::InvalidArgument(_)));
    }

    #[test]
    fn test_valid_invocation_passes() {
        let template = resolve(Resource::Requests, Action::List).unwrap();
        let modifiers = ListModifiers {
            limit: Some(10),
            offset: Some(5),
            order_by: None,
        };
        assert!(validate_invocation(&template, None, &modifiers, false).is_ok());
    }
}
