use crate::error::{CanvasFlowError, Result};

const MAX_NAME_LEN: usize = 100;

/// 输入校验
pub struct InputValidator;

impl InputValidator {
    /// 验证工作流名称
    pub fn validate_flow_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CanvasFlowError::Other(anyhow::anyhow!(
                "flow name must not be empty"
            )));
        }

        if name.chars().count() > MAX_NAME_LEN {
            return Err(CanvasFlowError::Other(anyhow::anyhow!(
                "flow name is too long (at most {MAX_NAME_LEN} characters)"
            )));
        }

        Ok(())
    }

    /// 验证 workspace ID
    pub fn validate_workspace_id(workspace_id: &str) -> Result<()> {
        if workspace_id.is_empty() {
            return Err(CanvasFlowError::Other(anyhow::anyhow!(
                "workspace id must not be empty"
            )));
        }

        if !workspace_id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(CanvasFlowError::Other(anyhow::anyhow!(
                "workspace id `{workspace_id}` may only contain letters, digits, `_` and `-`"
            )));
        }

        Ok(())
    }
}
