/// Loaded-model state: format detection and the `CurrentModel` resource.
pub mod model;

/// Share-link payload encoding: model bytes packed into a single
/// base64 query-parameter value, and the reverse.
pub mod share_link;
