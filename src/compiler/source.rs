//! 源级阶段：下载 + 预处理 -> 源级过滤与转换 -> 源头注释

use std::time::Instant;

use rshostlist_engine::{transform::build_wildcards, TransformationPipeline, Wildcard};
use tracing::{debug, warn};

use crate::compiler::header::source_header;
use crate::compiler::metrics::{count_rules, millis, SourceMetrics};
use crate::config::SourceConfig;
use crate::error::CompilerResult;
use crate::fetch::ContentAcquirer;
use crate::preprocessor::FilterDownloader;

/// 源级阶段输出
#[derive(Debug, Clone, Default)]
pub struct SourceOutput {
    pub lines: Vec<String>,
    pub metrics: SourceMetrics,
    pub warnings: Vec<String>,
}

/// 构造过滤器：字面过滤器 + 外部过滤器列表（每个非空、非注释行一个过滤器）
/// 外部列表获取失败只记告警；过滤器本身非法（正则无法编译）视为配置错误
pub async fn build_filters(
    acquirer: &ContentAcquirer,
    literals: &[String],
    sources: &[String],
    warnings: &mut Vec<String>,
) -> CompilerResult<Vec<Wildcard>> {
    let mut filters = build_wildcards(literals.iter().map(String::as_str))?;

    for source in sources {
        match acquirer.fetch(source).await {
            Ok(text) => filters.extend(build_wildcards(text.lines())?),
            Err(e) => {
                let message = format!("failed to load filter list {}: {}", source, e);
                warn!("{}", message);
                warnings.push(message);
            }
        }
    }

    Ok(filters)
}

/// 执行单个源的完整阶段
pub async fn compile_source(
    downloader: &FilterDownloader,
    source: &SourceConfig,
    emit_header: bool,
) -> CompilerResult<SourceOutput> {
    let start = Instant::now();
    let download = downloader.download(&source.source).await?;
    let raw_rules = count_rules(&download.lines);
    let mut warnings = download.warnings;

    let acquirer = downloader.acquirer();
    let exclusions = build_filters(acquirer, &source.exclusions, &source.exclusions_sources, &mut warnings).await?;
    let inclusions = build_filters(acquirer, &source.inclusions, &source.inclusions_sources, &mut warnings).await?;

    let pipeline = TransformationPipeline::new(&source.transformations)
        .with_exclusions(exclusions)
        .with_inclusions(inclusions);
    let transformed = pipeline.apply(download.lines).lines;

    let metrics = SourceMetrics {
        name: source.display_name().to_string(),
        source: source.source.clone(),
        source_type: source.source_type.as_str().to_string(),
        raw_rules,
        final_rules: count_rules(&transformed),
        duration_ms: millis(start.elapsed()),
    };
    debug!(
        "Source {} compiled | raw: {} | final: {} | {} ms",
        metrics.name, metrics.raw_rules, metrics.final_rules, metrics.duration_ms
    );

    let lines = if emit_header {
        let mut lines = source_header(source);
        lines.extend(transformed);
        lines
    } else {
        transformed
    };

    Ok(SourceOutput {
        lines,
        metrics,
        warnings,
    })
}
