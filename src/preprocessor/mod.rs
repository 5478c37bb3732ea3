//! 指令预处理：`!#if` / `!#else` / `!#endif` / `!#include` / `!#safari_cb_affinity`

pub mod directive;
pub mod downloader;

pub use directive::{resolve_conditionals, Directive};
pub use downloader::{DownloadResult, FilterDownloader};
