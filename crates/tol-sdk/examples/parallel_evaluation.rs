//! 并行评估示例
//!
//! 模拟一批机器人个体在多个工作线程上并行评估适应度，
//! 用 `join_mapping_with` 把所有评估结果合并为一个 Promise。
//!
//! 运行：
//!
//! ```bash
//! RUST_LOG=debug cargo run -p tol-sdk --example parallel_evaluation
//! ```

use crossbeam_channel::unbounded;
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tol_sdk::{
    CollectingObserver, Failure, JoinMetrics, JoinOptions, Promise, init_logger, join_mapping_with,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EvalKind {
    /// 仿真器崩溃
    SimulatorCrash,
    /// 评估被取消（例如种群已被淘汰）
    Cancelled,
}

type Fitness = Promise<f64, Failure<EvalKind>>;

struct Job {
    robot: String,
    fitness: Fitness,
}

fn main() {
    init_logger();

    let (tx, rx) = unbounded::<Job>();
    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let rx = rx.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for job in rx {
                    thread::sleep(Duration::from_millis(rng.gen_range(5..40)));
                    let roll: f64 = rng.r#gen();
                    let result = if job.robot == "robot-3" {
                        job.fitness
                            .reject(Failure::new(EvalKind::SimulatorCrash, "gazebo exited"))
                    } else if roll < 0.2 {
                        job.fitness
                            .reject(Failure::new(EvalKind::Cancelled, "population culled"))
                    } else {
                        job.fitness.resolve(roll * 10.0)
                    };
                    if let Err(err) = result {
                        tracing::warn!(worker, "{err}");
                    }
                }
            })
        })
        .collect();

    let robots: Vec<(String, Fitness)> = (0..8)
        .map(|i| (format!("robot-{i}"), Promise::new()))
        .collect();

    let metrics = Arc::new(JoinMetrics::new());
    let collector = Arc::new(CollectingObserver::<Failure<EvalKind>>::new());
    let options = JoinOptions::<Failure<EvalKind>>::new()
        .with_quiet_kinds([EvalKind::Cancelled])
        .with_metrics(metrics.clone())
        .with_observer(collector.clone());

    let generation = join_mapping_with(robots.clone(), options);

    for (robot, fitness) in robots {
        if tx.send(Job { robot, fitness }).is_err() {
            break;
        }
    }
    drop(tx);
    for worker in workers {
        let _ = worker.join();
    }

    match generation.outcome() {
        Some(Ok(scores)) => {
            for (robot, score) in &scores {
                println!("{robot}: {score:.3}");
            }
        },
        Some(Err(err)) => println!("generation failed: {err}"),
        None => println!("generation still pending"),
    }

    for (position, err) in collector.take() {
        println!("suppressed failure at #{position}: {err}");
    }
    println!("{:?}", metrics.snapshot());
}
