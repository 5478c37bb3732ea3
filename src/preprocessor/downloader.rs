//! 递归下载：获取源 -> 展开条件块 -> 递归处理 `!#include`
//! include 状态（已访问集合 + 告警）仅在一次顶层 download 调用内有效

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use rshostlist_engine::ExpressionEvaluator;
use tracing::{debug, warn};

use crate::error::CompilerResult;
use crate::fetch::ContentAcquirer;
use crate::preprocessor::directive::{resolve_conditionals, Directive};

type BoxedLines<'a> = Pin<Box<dyn Future<Output = CompilerResult<Vec<String>>> + Send + 'a>>;

/// 单次顶层下载的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadResult {
    pub lines: Vec<String>,
    /// 被跳过或失败的 include（不影响本次下载结果）
    pub warnings: Vec<String>,
}

/// 单次顶层下载的私有状态
#[derive(Debug, Default)]
struct DownloadState {
    visited: HashSet<String>,
    warnings: Vec<String>,
}

impl DownloadState {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// 源下载器
#[derive(Clone)]
pub struct FilterDownloader {
    acquirer: ContentAcquirer,
    evaluator: ExpressionEvaluator,
    max_include_depth: usize,
}

impl FilterDownloader {
    pub fn new(acquirer: ContentAcquirer) -> Self {
        let evaluator = ExpressionEvaluator::new(acquirer.options().platform.clone());
        let max_include_depth = acquirer.options().max_include_depth;
        Self {
            acquirer,
            evaluator,
            max_include_depth,
        }
    }

    pub fn acquirer(&self) -> &ContentAcquirer {
        &self.acquirer
    }

    /// 下载并展开一个顶层源
    /// 顶层源的获取失败与指令结构错误向上传播；include 失败只记告警
    pub async fn download(&self, source: &str) -> CompilerResult<DownloadResult> {
        let mut state = DownloadState::default();
        state.visited.insert(source.to_string());

        let text = self.acquirer.fetch(source).await?;
        let lines = self.process(source, &text, 0, &mut state).await?;

        debug!(
            "Downloaded {} | lines: {} | include warnings: {}",
            source,
            lines.len(),
            state.warnings.len()
        );
        Ok(DownloadResult {
            lines,
            warnings: state.warnings,
        })
    }

    fn process<'a>(
        &'a self,
        source_id: &'a str,
        text: &'a str,
        depth: usize,
        state: &'a mut DownloadState,
    ) -> BoxedLines<'a> {
        Box::pin(async move {
            let resolved = resolve_conditionals(source_id, text, &self.evaluator)?;
            let mut output = Vec::with_capacity(resolved.len());

            for (line_no, line) in resolved {
                let Directive::Include(include_path) = Directive::classify(line) else {
                    output.push(line.to_string());
                    continue;
                };

                let included = self
                    .include(source_id, line_no, include_path, depth + 1, state)
                    .await;
                output.extend(included);
            }

            Ok(output)
        })
    }

    /// 处理单个 `!#include`，任何失败都只产生告警与零行
    async fn include(
        &self,
        source_id: &str,
        line_no: usize,
        include_path: &str,
        depth: usize,
        state: &mut DownloadState,
    ) -> Vec<String> {
        if include_path.is_empty() {
            state.warn(format!("{}:{}: `!#include` without a path", source_id, line_no));
            return Vec::new();
        }

        let resolved = match self.acquirer.resolve_include_path(include_path, source_id) {
            Ok(resolved) => resolved,
            Err(e) => {
                state.warn(format!(
                    "{}:{}: cannot resolve include {}: {}",
                    source_id, line_no, include_path, e
                ));
                return Vec::new();
            }
        };

        if depth > self.max_include_depth {
            state.warn(format!(
                "{}:{}: include depth limit ({}) exceeded, skipping {}",
                source_id, line_no, self.max_include_depth, resolved
            ));
            return Vec::new();
        }

        if !state.visited.insert(resolved.clone()) {
            state.warn(format!(
                "{}:{}: circular include detected, skipping {}",
                source_id, line_no, resolved
            ));
            return Vec::new();
        }

        let text = match self.acquirer.fetch(&resolved).await {
            Ok(text) => text,
            Err(e) => {
                state.warn(format!("{}:{}: failed to include {}: {}", source_id, line_no, resolved, e));
                return Vec::new();
            }
        };

        match self.process(&resolved, &text, depth, state).await {
            Ok(lines) => lines,
            Err(e) => {
                state.warn(format!("{}:{}: failed to process {}: {}", source_id, line_no, resolved, e));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{CompilerOptions, CustomConfigBuilder, RetryPolicy};
    use crate::error::CompilerError;
    use crate::fetch::mock::{Reply, ScriptedHttpClient};
    use crate::fetch::MemoryFileSystem;

    fn downloader(fs: MemoryFileSystem, options: CompilerOptions) -> FilterDownloader {
        let acquirer = ContentAcquirer::new(Arc::new(ScriptedHttpClient::new()), Arc::new(fs), options);
        FilterDownloader::new(acquirer)
    }

    fn default_options() -> CompilerOptions {
        CustomConfigBuilder::new().retry(RetryPolicy::Never).build()
    }

    #[tokio::test]
    async fn test_include_relative_file() {
        let fs = MemoryFileSystem::new()
            .with_file("/lists/main.txt", "||a.org^\n!#include sub/extra.txt\n||c.org^")
            .with_file("/lists/sub/extra.txt", "||b.org^");
        let result = downloader(fs, default_options()).download("/lists/main.txt").await.unwrap();
        assert_eq!(result.lines, vec!["||a.org^", "||b.org^", "||c.org^"]);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_circular_include_skipped() {
        let fs = MemoryFileSystem::new()
            .with_file("/l/a.txt", "a1\n!#include b.txt\na2")
            .with_file("/l/b.txt", "b1\n!#include a.txt\nb2");
        let result = downloader(fs, default_options()).download("/l/a.txt").await.unwrap();
        assert_eq!(result.lines, vec!["a1", "b1", "b2", "a2"]);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("circular include"));
    }

    #[tokio::test]
    async fn test_visited_set_fresh_per_download() {
        let fs = MemoryFileSystem::new()
            .with_file("/l/a.txt", "a\n!#include shared.txt")
            .with_file("/l/shared.txt", "shared");
        let dl = downloader(fs, default_options());
        let first = dl.download("/l/a.txt").await.unwrap();
        let second = dl.download("/l/a.txt").await.unwrap();
        assert_eq!(first.lines, vec!["a", "shared"]);
        assert_eq!(second.lines, first.lines);
    }

    #[tokio::test]
    async fn test_depth_guard() {
        // 0 -> 1 -> 2 -> 3，上限 2：第 3 层被跳过
        let fs = MemoryFileSystem::new()
            .with_file("/d/0.txt", "l0\n!#include 1.txt")
            .with_file("/d/1.txt", "l1\n!#include 2.txt")
            .with_file("/d/2.txt", "l2\n!#include 3.txt")
            .with_file("/d/3.txt", "l3");
        let options = CustomConfigBuilder::new().max_include_depth(2).build();
        let result = downloader(fs, options).download("/d/0.txt").await.unwrap();
        assert_eq!(result.lines, vec!["l0", "l1", "l2"]);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("depth limit"));
    }

    #[tokio::test]
    async fn test_include_failures_absorbed() {
        let fs = MemoryFileSystem::new()
            .with_file("/l/main.txt", "a\n!#include missing.txt\n!#include broken.txt\nb")
            .with_file("/l/broken.txt", "!#if true\nx");
        let result = downloader(fs, default_options()).download("/l/main.txt").await.unwrap();
        assert_eq!(result.lines, vec!["a", "b"]);
        assert_eq!(result.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_top_level_errors_propagate() {
        let fs = MemoryFileSystem::new().with_file("/l/bad.txt", "a\n!#if true\nb");
        let dl = downloader(fs, default_options());
        assert!(matches!(
            dl.download("/l/bad.txt").await,
            Err(CompilerError::PreprocessorError { line: 2, .. })
        ));
        assert!(matches!(
            dl.download("/l/missing.txt").await,
            Err(CompilerError::FileSystemError { .. })
        ));
    }

    #[tokio::test]
    async fn test_conditional_include_and_platform() {
        let fs = MemoryFileSystem::new()
            .with_file("/l/main.txt", "!#if windows\n!#include win.txt\n!#else\nother\n!#endif")
            .with_file("/l/win.txt", "win-rule");
        let options = CustomConfigBuilder::new().platform("windows").build();
        let result = downloader(fs, options).download("/l/main.txt").await.unwrap();
        assert_eq!(result.lines, vec!["win-rule"]);
    }

    #[tokio::test]
    async fn test_remote_include_resolution() {
        let http = ScriptedHttpClient::new()
            .ok("https://example.org/lists/main.txt", "m\n!#include ../common/extra.txt")
            .ok("https://example.org/common/extra.txt", "e")
            .reply("https://example.org/lists/bad.txt", Reply::Status(404, String::new()));
        let acquirer = ContentAcquirer::new(Arc::new(http), Arc::new(MemoryFileSystem::new()), default_options());
        let result = FilterDownloader::new(acquirer)
            .download("https://example.org/lists/main.txt")
            .await
            .unwrap();
        assert_eq!(result.lines, vec!["m", "e"]);
    }
}
