//! Error mapping from the service taxonomy to GraphQL errors.

use async_graphql::ErrorExtensions;

/// Convert a service error into a GraphQL error carrying the taxonomy
/// kind (`NOT_FOUND`, `INVALID_ARGUMENT`, ...) as a `kind` extension.
pub fn gql_err(err: ladder_common::Error) -> async_graphql::Error {
    let kind = err.kind().as_str();
    async_graphql::Error::new(err.to_string()).extend_with(|_, ext| ext.set("kind", kind))
}

/// Shorthand for resolvers returning service results.
pub fn from_service<T>(result: ladder_common::Result<T>) -> async_graphql::Result<T> {
    result.map_err(gql_err)
}
