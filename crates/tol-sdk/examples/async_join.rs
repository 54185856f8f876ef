//! 在 tokio 中等待合并结果
//!
//! 子 Promise 由 tokio 任务在随机延迟后 settle，调用方直接 `.await` 合并后的 Promise。

use std::time::Duration;
use tol_sdk::{Failure, Promise, init_logger, join_sequence};

#[tokio::main]
async fn main() {
    init_logger();

    let sensors: Vec<Promise<u32, Failure<&'static str>>> =
        (0..5).map(|_| Promise::new()).collect();

    for (i, sensor) in sensors.iter().cloned().enumerate() {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10 * (5 - i as u64))).await;
            let _ = sensor.resolve(i as u32 * 100);
        });
    }

    match join_sequence(sensors).await {
        Ok(readings) => tracing::info!(?readings, "all sensors reported"),
        Err(err) => tracing::error!("sensor failed: {err}"),
    }
}
