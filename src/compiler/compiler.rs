//! 编译器入口
//! 顶层源按配置顺序并发下载（信号量限流），每个源拥有独立的 include 状态；
//! 任一顶层源失败即整体失败，错误中带有失败源的标识

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rshostlist_engine::TransformationPipeline;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::compiler::header::list_header;
use crate::compiler::metrics::{count_rules, millis, CompilationMetrics};
use crate::compiler::source::{build_filters, compile_source, SourceOutput};
use crate::config::{CompilerOptions, Configuration};
use crate::error::{CompilerError, CompilerResult};
use crate::fetch::ContentAcquirer;
use crate::preprocessor::FilterDownloader;

/// 编译结果
#[derive(Debug, Clone, Default)]
pub struct CompileResult {
    pub rules: Vec<String>,
    pub metrics: CompilationMetrics,
}

/// 过滤列表编译器
#[derive(Clone)]
pub struct HostlistCompiler {
    downloader: FilterDownloader,
}

impl HostlistCompiler {
    pub fn new(acquirer: ContentAcquirer) -> Self {
        Self {
            downloader: FilterDownloader::new(acquirer),
        }
    }

    /// reqwest + 本地磁盘
    pub fn with_options(options: CompilerOptions) -> CompilerResult<Self> {
        Ok(Self::new(ContentAcquirer::with_defaults(options)?))
    }

    pub fn options(&self) -> &CompilerOptions {
        self.downloader.acquirer().options()
    }

    pub async fn compile(&self, config: &Configuration) -> CompilerResult<CompileResult> {
        config.validate()?;
        let start = Instant::now();
        let options = self.options();
        info!("Compiling {} ({} sources)", config.name, config.sources.len());

        let outputs = self.compile_sources(config).await?;

        let mut metrics = CompilationMetrics::default();
        let mut lines = Vec::new();
        for output in outputs {
            metrics.sources.push(output.metrics);
            metrics.warnings.extend(output.warnings);
            lines.extend(output.lines);
        }

        let acquirer = self.downloader.acquirer();
        let exclusions =
            build_filters(acquirer, &config.exclusions, &config.exclusions_sources, &mut metrics.warnings).await?;
        let inclusions =
            build_filters(acquirer, &config.inclusions, &config.inclusions_sources, &mut metrics.warnings).await?;

        let mut pipeline = TransformationPipeline::new(&config.transformations)
            .with_exclusions(exclusions)
            .with_inclusions(inclusions);
        if let Some(optimization) = &config.optimization {
            pipeline = pipeline.with_optimizer(optimization.clone());
        }
        let output = pipeline.apply(lines);
        metrics.optimization = output.optimization;

        let rules = if options.emit_header {
            let mut rules = list_header(config, Utc::now());
            rules.extend(output.lines);
            rules
        } else {
            output.lines
        };

        metrics.rule_count = count_rules(&rules);
        metrics.total_duration_ms = millis(start.elapsed());
        info!(
            "Compiled {} | rules: {} | warnings: {} | {} ms",
            config.name,
            metrics.rule_count,
            metrics.warnings.len(),
            metrics.total_duration_ms
        );

        Ok(CompileResult { rules, metrics })
    }

    /// 并发执行各源阶段，结果按配置顺序返回
    async fn compile_sources(&self, config: &Configuration) -> CompilerResult<Vec<SourceOutput>> {
        let concurrency = self.options().concurrency.max(1);
        let emit_header = self.options().emit_header;
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut handles = Vec::with_capacity(config.sources.len());

        for source in &config.sources {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| CompilerError::AsyncTaskError(e.to_string()))?;
            let downloader = self.downloader.clone();
            let source = source.clone();

            handles.push(tokio::spawn(async move {
                let _permit_guard = permit; // 任务结束自动释放许可
                compile_source(&downloader, &source, emit_header).await
            }));
        }
        debug!("Spawned {} source tasks (concurrency {})", handles.len(), concurrency);

        join_in_order(handles).await
    }
}

/// 按提交顺序收集任务结果；任一失败时中止其余仍在运行的任务
async fn join_in_order<T>(handles: Vec<JoinHandle<CompilerResult<T>>>) -> CompilerResult<Vec<T>> {
    let mut outputs = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();

    while let Some(handle) = pending.next() {
        let result = handle
            .await
            .map_err(|e| CompilerError::AsyncTaskError(e.to_string()))
            .and_then(|r| r);
        match result {
            Ok(output) => outputs.push(output),
            Err(e) => {
                let aborted = pending.len();
                pending.for_each(|h| h.abort());
                debug!("Source task failed, aborted {} remaining tasks", aborted);
                return Err(e);
            }
        }
    }
    Ok(outputs)
}

/// 便捷函数：默认选项编译
pub async fn compile(configuration: &Configuration) -> CompilerResult<CompileResult> {
    HostlistCompiler::with_options(CompilerOptions::default())?
        .compile(configuration)
        .await
}

#[cfg(test)]
mod tests {
    use rshostlist_engine::{OptimizerOptions, Transformation};

    use super::*;
    use crate::config::{CustomConfigBuilder, RetryPolicy, SourceConfig, SourceType};
    use crate::fetch::mock::{Reply, ScriptedHttpClient};
    use crate::fetch::MemoryFileSystem;

    fn compiler(http: ScriptedHttpClient, fs: MemoryFileSystem, emit_header: bool) -> HostlistCompiler {
        let options = CustomConfigBuilder::new()
            .retry(RetryPolicy::Never)
            .emit_header(emit_header)
            .concurrency(2)
            .build();
        HostlistCompiler::new(ContentAcquirer::new(Arc::new(http), Arc::new(fs), options))
    }

    fn config(sources: Vec<SourceConfig>, transformations: Vec<Transformation>) -> Configuration {
        Configuration {
            name: "Test".to_string(),
            sources,
            transformations,
            ..Configuration::default()
        }
    }

    #[tokio::test]
    async fn test_compile_end_to_end() {
        let http = ScriptedHttpClient::new().ok(
            "https://example.org/hosts.txt",
            "# hosts\n0.0.0.0 ads.example.com\n0.0.0.0 localhost\n",
        );
        let fs = MemoryFileSystem::new().with_file(
            "/l/adblock.txt",
            "! local\n||tracker.example.org^\n||ads.example.com^\n!#if windows\n||win.example.org^\n!#endif\n",
        );
        let cfg = config(
            vec![
                SourceConfig::new("https://example.org/hosts.txt", SourceType::Hosts),
                SourceConfig::new("/l/adblock.txt", SourceType::Adblock),
            ],
            vec![
                Transformation::RemoveComments,
                Transformation::Compress,
                Transformation::Validate,
                Transformation::RemoveEmptyLines,
                Transformation::InsertFinalNewLine,
            ],
        );

        let result = compiler(http, fs, false).compile(&cfg).await.unwrap();
        assert_eq!(result.rules, vec!["||ads.example.com^", "||tracker.example.org^", ""]);
        assert_eq!(result.metrics.rule_count, 2);
        assert_eq!(result.metrics.sources.len(), 2);
        assert_eq!(result.metrics.sources[0].source_type, "hosts");
        assert!(result.metrics.optimization.is_none());
    }

    #[tokio::test]
    async fn test_headers_emitted() {
        let fs = MemoryFileSystem::new().with_file("/l/a.txt", "||a.example.org^");
        let cfg = config(vec![SourceConfig::new("/l/a.txt", SourceType::Adblock)], vec![]);
        let result = compiler(ScriptedHttpClient::new(), fs, true).compile(&cfg).await.unwrap();

        assert_eq!(result.rules[1], "! Title: Test");
        assert!(result.rules.iter().any(|l| l == "! Source: /l/a.txt"));
        assert_eq!(result.rules.last().map(String::as_str), Some("||a.example.org^"));
        assert_eq!(result.metrics.rule_count, 1);
    }

    #[tokio::test]
    async fn test_top_level_failure_names_source() {
        let http = ScriptedHttpClient::new().reply("https://example.org/gone.txt", Reply::Status(404, String::new()));
        let fs = MemoryFileSystem::new().with_file("/l/a.txt", "||a.example.org^");
        let cfg = config(
            vec![
                SourceConfig::new("/l/a.txt", SourceType::Adblock),
                SourceConfig::new("https://example.org/gone.txt", SourceType::Adblock),
            ],
            vec![],
        );
        let err = compiler(http, fs, false).compile(&cfg).await.unwrap_err();
        assert!(err.to_string().contains("https://example.org/gone.txt"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_list_level_filters_and_optimizer() {
        let fs = MemoryFileSystem::new()
            .with_file("/l/a.txt", "||example.com^\n||ads.example.com^\n||drop.example.net^\n||x.example.org^$important,important")
            .with_file("/l/exclude.txt", "drop.example.net");
        let mut cfg = config(vec![SourceConfig::new("/l/a.txt", SourceType::Adblock)], vec![]);
        cfg.exclusions_sources = vec!["/l/exclude.txt".to_string()];
        cfg.optimization = Some(OptimizerOptions::default());

        let result = compiler(ScriptedHttpClient::new(), fs, false).compile(&cfg).await.unwrap();
        assert_eq!(result.rules, vec!["||example.com^", "||x.example.org^$important"]);

        let stats = result.metrics.optimization.unwrap();
        assert_eq!(stats.redundant_removed, 1);
        assert_eq!(stats.modifiers_simplified, 1);
    }

    #[tokio::test]
    async fn test_include_warnings_collected() {
        let fs = MemoryFileSystem::new().with_file("/l/a.txt", "||a.example.org^\n!#include missing.txt");
        let cfg = config(vec![SourceConfig::new("/l/a.txt", SourceType::Adblock)], vec![]);
        let result = compiler(ScriptedHttpClient::new(), fs, false).compile(&cfg).await.unwrap();
        assert_eq!(result.rules, vec!["||a.example.org^"]);
        assert_eq!(result.metrics.warnings.len(), 1);
    }

    struct DropFlag(Arc<std::sync::atomic::AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_failed_task_aborts_remaining() {
        let dropped = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = DropFlag(dropped.clone());

        let failing = tokio::spawn(async {
            Err::<u32, _>(CompilerError::ConfigError("boom".to_string()))
        });
        let slow = tokio::spawn(async move {
            let _flag = flag;
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(1u32)
        });

        let err = join_in_order(vec![failing, slow]).await.unwrap_err();
        assert!(matches!(err, CompilerError::ConfigError(_)));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(dropped.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_join_in_order_keeps_submission_order() {
        let first = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok::<_, CompilerError>("a")
        });
        let second = tokio::spawn(async { Ok::<_, CompilerError>("b") });
        assert_eq!(join_in_order(vec![first, second]).await.unwrap(), vec!["a", "b"]);
    }
}
