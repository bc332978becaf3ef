//! Tool host trait.

use super::{ToolArguments, ToolError, ToolOutput, ToolSpec};
use std::future::Future;

/// Trait for tool execution hosts.
///
/// Implementations expose the tool set discovered at startup and invoke
/// tools by name. This is the boundary between the model loop and side
/// effects.
pub trait ToolHost: Send + Sync {
    /// Tools available for the whole session.
    fn specs(&self) -> &[ToolSpec];

    /// Invoke the tool `name`.
    fn invoke(
        &self,
        name: &str,
        arguments: ToolArguments,
    ) -> impl Future<Output = Result<ToolOutput, ToolError>> + Send;
}
