//! Organization slug to id resolution.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::graphql::{GraphqlOperation, TypedGraphqlClient};

/// Looks up an organization's durable id by slug.
pub struct GetOrganization;

/// Variables for [`GetOrganization`].
#[derive(Debug, Clone, Serialize)]
pub struct GetOrganizationVariables {
    pub slug: String,
}

/// Response data for [`GetOrganization`].
#[derive(Debug, Clone, Deserialize)]
pub struct GetOrganizationData {
    pub organization: Option<OrganizationNode>,
}

/// The organization fields selected by [`GetOrganization`].
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationNode {
    pub id: String,
}

impl GraphqlOperation for GetOrganization {
    type Variables = GetOrganizationVariables;
    type ResponseData = GetOrganizationData;

    const QUERY: &'static str =
        "query GetOrganization($slug: ID!) { organization(slug: $slug) { id } }";
    const OPERATION_NAME: &'static str = "GetOrganization";
}

/// Resolve `slug` to the organization's id.
///
/// A missing organization, or one with an empty id, is
/// [`ErrorKind::OrganizationNotFound`]. Transport and GraphQL errors are
/// returned unchanged.
#[instrument(skip(client))]
pub async fn resolve_organization_id(slug: &str, client: &TypedGraphqlClient) -> Result<String> {
    let data = client
        .execute_strict::<GetOrganization>(GetOrganizationVariables {
            slug: slug.to_string(),
        })
        .await?;

    match data.organization {
        Some(org) if !org.id.is_empty() => {
            debug!(organization_id = %org.id, "Resolved organization");
            Ok(org.id)
        }
        _ => Err(Error::new(ErrorKind::OrganizationNotFound(slug.to_string()))),
    }
}
