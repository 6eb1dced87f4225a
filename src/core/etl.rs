use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<Vec<String>> {
        println!("Starting ETL process...");

        // Extract
        println!("Extracting data...");
        let table = self.pipeline.extract().await?;
        println!("Extracted {} records", table.len());
        self.monitor.log_stats("Extract");

        // Transform
        println!("Transforming data...");
        let transformed = self.pipeline.transform(&table).await?;
        println!("Transformed {} records", transformed.len());
        self.monitor.log_stats("Transform");

        // Load
        println!("Loading data...");
        let outputs = self.pipeline.load(&transformed).await?;
        for output in &outputs {
            println!("Output saved to: {}", output);
        }
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(outputs)
    }
}
