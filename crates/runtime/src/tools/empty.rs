//! Empty tool host implementation.

use super::{ToolArguments, ToolError, ToolHost, ToolOutput, ToolSpec};

/// A no-op tool host with no tools.
///
/// Useful for testing or for chatting without a tool server.
#[derive(Debug, Default)]
pub struct EmptyToolHost;

impl ToolHost for EmptyToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &[]
    }

    async fn invoke(&self, name: &str, _arguments: ToolArguments) -> Result<ToolOutput, ToolError> {
        Err(ToolError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_host_has_no_tools() {
        let host = EmptyToolHost;
        assert!(host.specs().is_empty());
        let err = host
            .invoke("current_date", ToolArguments::default())
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::NotFound("current_date".into()));
    }
}
