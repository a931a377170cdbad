use anyhow::Result;
use snowball_sim::{Simulation, SimulationOutcome, SimulationReport, UpdateOrder, Vote};
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// n = 100, k = 10, α = 8, β = 5 with a 90/10 Yes supermajority
fn supermajority_run(seed: u64, order: UpdateOrder) -> Result<SimulationReport> {
    let sim = Simulation::builder()
        .population_size(100)
        .weights(0.9, 0.1)
        .sample_size(10)
        .quorum_size(8)
        .decision_threshold(5)
        .max_rounds(500)
        .seed(seed)
        .update_order(order)
        .build()?;
    Ok(sim.run())
}

#[test]
fn test_supermajority_converges_to_majority() -> Result<()> {
    init_tracing();

    let trials = 20;
    let mut agreeing = 0;
    for seed in 0..trials {
        let report = supermajority_run(seed, UpdateOrder::Ascending)?;
        if report.outcome.is_converged() && report.unanimous_decision() == Some(Vote::Yes) {
            agreeing += 1;
        }
    }

    assert!(
        agreeing >= 18,
        "only {} of {} seeded runs converged on the majority",
        agreeing,
        trials
    );
    Ok(())
}

#[test]
fn test_same_seed_same_history() -> Result<()> {
    for order in [UpdateOrder::Ascending, UpdateOrder::Shuffled] {
        let first = supermajority_run(7, order)?;
        let second = supermajority_run(7, order)?;
        assert_eq!(first, second);
    }
    Ok(())
}

#[test]
fn test_history_ends_with_terminal_state() -> Result<()> {
    let report = supermajority_run(3, UpdateOrder::Ascending)?;
    let last = report.final_snapshot().expect("history is never empty");

    match report.outcome {
        SimulationOutcome::Converged { rounds } => {
            assert!(last.all_decided());
            assert_eq!(last.round, rounds);
        }
        SimulationOutcome::Exhausted { rounds, undecided } => {
            assert_eq!(last.round, rounds);
            assert_eq!(last.nodes.len() - last.decided_count(), undecided);
        }
    }
    assert_eq!(report.history.len() as u64, report.outcome.rounds() + 1);
    Ok(())
}

#[test]
fn test_decisions_never_change_across_snapshots() -> Result<()> {
    let report = supermajority_run(11, UpdateOrder::Shuffled)?;
    let snapshots = report.history.snapshots();

    for pair in snapshots.windows(2) {
        for (before, after) in pair[0].nodes.iter().zip(&pair[1].nodes) {
            if before.decision.is_some() {
                assert_eq!(before, after, "a decided node changed state");
            }
        }
    }
    Ok(())
}

#[test]
fn test_tallies_cover_every_node() -> Result<()> {
    let report = supermajority_run(5, UpdateOrder::Ascending)?;
    let tallies = report.history.tallies();

    assert_eq!(tallies.len(), report.history.len());
    assert!(tallies.iter().all(|t| t.total() == 100));
    assert_eq!(tallies.last().and_then(|t| t.majority()), Some(Vote::Yes));
    Ok(())
}

#[test]
fn test_iterator_can_be_consumed_lazily() -> Result<()> {
    let sim = Simulation::builder()
        .population_size(50)
        .sample_size(5)
        .quorum_size(4)
        .decision_threshold(3)
        .seed(99)
        .build()?;

    let first_three: Vec<u64> = sim.take(3).map(|s| s.round).collect();
    assert_eq!(first_three, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn test_report_json_uses_stable_field_names() -> Result<()> {
    let report = supermajority_run(1, UpdateOrder::Ascending)?;
    let json: serde_json::Value = serde_json::from_str(&report.to_json()?)?;

    assert_eq!(json["outcome"]["status"], "converged");
    let history = json["history"].as_array().expect("history is an array");
    assert_eq!(history.len(), report.history.len());

    let first = &history[0];
    assert_eq!(first["round"], 0);
    let node = &first["nodes"][0];
    assert!(node["preference"].is_string());
    assert_eq!(node["consecutive_success"], 0);
    assert!(node["decision"].is_null());
    Ok(())
}
