use crate::domain::model::RunSummary;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use tracing::{Instrument, Span};

/// 依序執行 extract → transform → load，任何階段失敗都會中止後續階段
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
    span: Span,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
            span: tracing::info_span!("etl_run"),
        }
    }

    /// 指定本次執行的 span，各階段的事件都記錄在它底下
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        let run_span = self.span.clone();
        tracing::info!(parent: &run_span, "🚀 Starting ETL process");
        self.monitor.log_stats("Start");

        let raw_data = self
            .pipeline
            .extract()
            .instrument(tracing::info_span!(parent: &run_span, "extract"))
            .await?;
        let rows_extracted = raw_data.len();
        self.monitor.log_stats("Extract");

        let transformed = self
            .pipeline
            .transform(raw_data)
            .instrument(tracing::info_span!(parent: &run_span, "transform"))
            .await?;
        let rows_loaded = transformed.records.len();
        let rows_rejected = transformed.rejected.len();
        self.monitor.log_stats("Transform");

        let destination = self
            .pipeline
            .load(transformed)
            .instrument(tracing::info_span!(parent: &run_span, "load"))
            .await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        tracing::info!(
            parent: &run_span,
            rows_extracted,
            rows_loaded,
            rows_rejected,
            "✅ ETL pipeline completed successfully"
        );

        Ok(RunSummary {
            rows_extracted,
            rows_loaded,
            rows_rejected,
            destination,
        })
    }
}
