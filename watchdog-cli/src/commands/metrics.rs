use chrono::Local;

use watchdog_core::metrics::{MetricKind, MetricsState};
use watchdog_core::poll::{MetricsPoller, PollTask};

use super::Session;

/// Take `samples` readings at the configured metrics interval, printing each
/// one, then a min/max summary over what was collected.
pub async fn run_metrics(session: &Session, samples: usize) -> Result<(), String> {
    if samples == 0 {
        return Err("--samples must be at least 1".into());
    }

    let dashboard = &session.dashboard;
    let state = dashboard.metrics().clone();
    let poller = MetricsPoller::new(dashboard.client().clone(), state.clone());
    let interval = dashboard.config().poll.metrics_interval();

    for i in 0..samples {
        if i > 0 {
            tokio::time::sleep(interval).await;
        }
        let before = state.read().await.samples;
        poller.tick().await;

        let metrics = state.read().await;
        if metrics.samples == before {
            println!("{}  metrics unavailable", Local::now().format("%H:%M:%S"));
        } else {
            println!("{}", format_latest(&metrics));
        }
    }

    let metrics = state.read().await;
    if metrics.samples == 0 {
        return Err(format!("no metrics received from {}", dashboard.client().base_url()));
    }
    println!();
    for kind in MetricKind::ALL {
        if let Some((min, max)) = metrics.window(kind).value_bounds() {
            println!("{:<15} min {:>5.1}  max {:>5.1}", kind.title(), min, max);
        }
    }
    Ok(())
}

fn format_latest(metrics: &MetricsState) -> String {
    let label = metrics.cpu.last_label().unwrap_or("--:--:--");
    let values: Vec<String> = MetricKind::ALL
        .iter()
        .map(|kind| {
            let value = metrics.window(*kind).latest().unwrap_or_default();
            format!("{} {:>5.1}%", kind.short(), value)
        })
        .collect();
    format!("{}  {}", label, values.join("  "))
}
