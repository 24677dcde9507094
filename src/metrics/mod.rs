pub mod logger;

use crate::controller::Mode;
use crate::experiment::{ExperimentResults, MessageRecord};
use serde::{Deserialize, Serialize};

/// Aggregate view of one experiment run: volume, security outcomes and
/// latency over the delivered subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub mode: Mode,
    pub total_messages: usize,
    pub total_legitimate: usize,
    pub total_rogue: usize,
    pub legitimate_accepted: usize,
    pub rogue_accepted: usize,
    /// Rogue messages that got through without ever authenticating, the
    /// headline number for the weak posture.
    pub rogue_unauthorised_accepted: usize,
    pub avg_latency_all_ms: f64,
    pub avg_latency_legitimate_ms: f64,
    pub avg_latency_rogue_ms: f64,
}

/// Mean latency over delivered records only. Empty set averages to 0.0
/// rather than NaN so the CSV/JSON stays plottable.
fn avg_latency(records: &[&MessageRecord]) -> f64 {
    let delivered: Vec<f64> = records
        .iter()
        .filter(|r| r.delivered)
        .map(|r| r.latency_ms)
        .collect();
    if delivered.is_empty() {
        return 0.0;
    }
    delivered.iter().sum::<f64>() / delivered.len() as f64
}

pub fn summarize(results: &ExperimentResults) -> Summary {
    let all: Vec<&MessageRecord> = results.records.iter().collect();
    let legit: Vec<&MessageRecord> = all
        .iter()
        .copied()
        .filter(|r| r.source == "legitimate")
        .collect();
    let rogue: Vec<&MessageRecord> = all
        .iter()
        .copied()
        .filter(|r| r.source == "rogue")
        .collect();

    Summary {
        mode: results.mode,
        total_messages: all.len(),
        total_legitimate: legit.len(),
        total_rogue: rogue.len(),
        legitimate_accepted: legit.iter().filter(|r| r.accepted).count(),
        rogue_accepted: rogue.iter().filter(|r| r.accepted).count(),
        rogue_unauthorised_accepted: rogue
            .iter()
            .filter(|r| r.accepted && !r.authorised)
            .count(),
        avg_latency_all_ms: avg_latency(&all),
        avg_latency_legitimate_ms: avg_latency(&legit),
        avg_latency_rogue_ms: avg_latency(&rogue),
    }
}

pub fn print_summary(summary: &Summary) {
    println!("=== Summary for mode: {} ===", summary.mode);
    println!("Total messages:           {}", summary.total_messages);
    println!("  Legitimate messages:    {}", summary.total_legitimate);
    println!("  Rogue messages:         {}", summary.total_rogue);
    println!();
    println!("Legitimate accepted:      {}", summary.legitimate_accepted);
    println!("Rogue accepted (any):     {}", summary.rogue_accepted);
    println!(
        "Rogue accepted (unauth.): {}",
        summary.rogue_unauthorised_accepted
    );
    println!();
    println!(
        "Average latency (all):    {:.2} ms",
        summary.avg_latency_all_ms
    );
    println!(
        "Average latency (legit):  {:.2} ms",
        summary.avg_latency_legitimate_ms
    );
    println!(
        "Average latency (rogue):  {:.2} ms",
        summary.avg_latency_rogue_ms
    );
    println!("===============================");
}

/// Side-by-side table over the modes, one row per run.
pub fn comparison_table(summaries: &[Summary]) {
    println!();
    println!(
        "{:<8} {:>8} {:>12} {:>10} {:>14} {:>12} {:>12}",
        "mode", "total", "legit acc", "rogue acc", "rogue unauth", "lat all", "lat legit"
    );
    println!("{}", "-".repeat(82));
    for s in summaries {
        println!(
            "{:<8} {:>8} {:>12} {:>10} {:>14} {:>10.2}ms {:>10.2}ms",
            s.mode.to_string(),
            s.total_messages,
            s.legitimate_accepted,
            s.rogue_accepted,
            s.rogue_unauthorised_accepted,
            s.avg_latency_all_ms,
            s.avg_latency_legitimate_ms,
        );
    }
    println!();
}
