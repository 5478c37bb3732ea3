//! 编译配置文档（JSON）

use std::path::Path;

use rshostlist_engine::{OptimizerOptions, Transformation};
use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, CompilerResult};

/// 源内容的语法类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Adblock,
    Hosts,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Adblock => "adblock",
            SourceType::Hosts => "hosts",
        }
    }
}

/// 单个源
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// URL 或本地路径
    pub source: String,
    #[serde(rename = "type", default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub transformations: Vec<Transformation>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub exclusions_sources: Vec<String>,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub inclusions_sources: Vec<String>,
}

impl SourceConfig {
    pub fn new(source: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            source: source.into(),
            source_type,
            ..Self::default()
        }
    }

    /// 日志与源头注释使用的名称
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.source)
    }
}

/// 编译配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub transformations: Vec<Transformation>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub exclusions_sources: Vec<String>,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub inclusions_sources: Vec<String>,
    /// 存在即启用优化器
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization: Option<OptimizerOptions>,
}

impl Configuration {
    /// 解析 JSON 并校验结构
    pub fn from_json(text: &str) -> CompilerResult<Self> {
        let config: Configuration = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从本地文件加载
    pub async fn load(path: impl AsRef<Path>) -> CompilerResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CompilerError::from_io(path.display().to_string(), &e))?;
        Self::from_json(&text)
    }

    /// 免配置文件的快速模式：全部输入视为同一类型，默认执行去重与收尾
    pub fn from_inputs(inputs: &[String], source_type: SourceType) -> Self {
        Self {
            name: "rshostlist".to_string(),
            sources: inputs
                .iter()
                .map(|input| SourceConfig::new(input.as_str(), source_type))
                .collect(),
            transformations: vec![
                Transformation::Deduplicate,
                Transformation::RemoveEmptyLines,
                Transformation::InsertFinalNewLine,
            ],
            ..Self::default()
        }
    }

    /// 结构校验：名称非空、至少一个源、源标识非空
    pub fn validate(&self) -> CompilerResult<()> {
        if self.name.trim().is_empty() {
            return Err(CompilerError::ConfigError("`name` must not be empty".to_string()));
        }
        if self.sources.is_empty() {
            return Err(CompilerError::ConfigError(
                "at least one source is required".to_string(),
            ));
        }
        if let Some(idx) = self.sources.iter().position(|s| s.source.trim().is_empty()) {
            return Err(CompilerError::ConfigError(format!(
                "sources[{}].source must not be empty",
                idx
            )));
        }
        if let Some(opt) = &self.optimization {
            if opt.merge_rules && opt.merge_threshold < 2 {
                return Err(CompilerError::ConfigError(
                    "optimization.merge_threshold must be at least 2".to_string(),
                ));
            }
        }
        Ok(())
    }
}
