use serde::{Deserialize, Serialize};

use crate::models::PluginInfo;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginsResponse {
    #[serde(default)]
    pub plugins: Vec<PluginInfo>,
}
