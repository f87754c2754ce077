use std::path::PathBuf;

use adoption_sim::agents::Agent;
use adoption_sim::scenarios;
use adoption_sim::{SimConfig, SimEngine, SimError};

fn heating_market_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join("heating_market.json")
}

fn short_run(cfg: &mut SimConfig) {
    cfg.number_total_steps = 10;
    cfg.consumers.count = 40;
}

fn adoption_snapshot(engine: &SimEngine) -> Vec<(u32, Vec<u32>)> {
    engine
        .ctx
        .consumers
        .iter()
        .map(|a| (a.id(), a.adoptions().iter().map(|x| x.product).collect()))
        .collect()
}

#[test]
fn bundled_scenario_parses_and_builds() {
    let path = heating_market_path();
    let cfg = scenarios::load_scenario(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.scenario_name, "heating_market");
    assert_eq!(cfg.companies.len(), 3);
    assert!(SimEngine::from_config(&cfg, None).is_ok());
}

#[test]
fn seeded_run_is_reproducible() {
    let mut cfg = SimConfig::from_file(heating_market_path()).unwrap();
    short_run(&mut cfg);

    let mut first = SimEngine::from_config(&cfg, None).unwrap();
    let s1 = first.run().unwrap();
    let mut second = SimEngine::from_config(&cfg, None).unwrap();
    let s2 = second.run().unwrap();

    assert_eq!(s1, s2);
    assert_eq!(adoption_snapshot(&first), adoption_snapshot(&second));
    assert_eq!(s1.steps_run, 11);
}

#[test]
fn certain_needs_and_free_perception_lead_to_adoption() {
    let json = r#"{
        "scenario_name": "certain",
        "number_total_steps": 3,
        "seed": 1,
        "needs": ["warmth"],
        "need_development": { "scheme": "deterministic", "indicators": { "warmth": 1.0 } },
        "process_model": { "adoption_threshold": 0.0, "price_sensitivity": 0.0 },
        "product_groups": [{ "id": 1, "name": "heating", "needs": ["warmth"] }],
        "products": [{ "id": 1, "name": "stove", "group": 1, "attributes": { "price": 1.0, "quality": 1.0 } }],
        "consumers": { "count": 4, "preferences": { "quality": 1.0 } },
        "companies": [{ "id": 1, "name": "acme", "portfolio": [1], "advertisement": { "scheme": "uniform" } }]
    }"#;
    let cfg = SimConfig::from_json(json).unwrap();
    let mut engine = SimEngine::from_config(&cfg, None).unwrap();
    engine.run().unwrap();

    for agent in &engine.ctx.consumers {
        assert!(agent.has_adopted(1), "agent {} did not adopt", agent.id());
        assert!(agent.active_needs().is_empty());
    }
}

#[test]
fn zero_indicators_never_create_needs() {
    let mut cfg = SimConfig::default();
    cfg.need_development.indicators.insert("warmth".to_string(), 0.0);
    cfg.need_development.indicators.insert("comfort".to_string(), 0.0);
    cfg.number_total_steps = 5;

    let mut engine = SimEngine::from_config(&cfg, None).unwrap();
    engine.run().unwrap();
    assert!(engine.ctx.consumers.iter().all(|a| a.adoptions().is_empty()));
    assert!(engine.ctx.consumers.iter().all(|a| a.active_needs().is_empty()));
}

#[test]
fn csv_logs_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = SimConfig::from_file(heating_market_path()).unwrap();
    short_run(&mut cfg);

    SimEngine::from_config(&cfg, Some(dir.path())).unwrap().run().unwrap();

    let agents = std::fs::read_to_string(dir.path().join("agents.csv")).unwrap();
    assert!(agents.starts_with("step,agent,name,active_needs,adopted_products,messages_received"));
    assert_eq!(agents.lines().count(), 1 + 40 * 11);
    let adoption = std::fs::read_to_string(dir.path().join("adoption.csv")).unwrap();
    assert!(adoption.starts_with("step,product,adopters,population,share"));
}

#[test]
fn configuration_errors_are_fatal() {
    let mut cfg = SimConfig::default();
    cfg.need_development.scheme = "tarot".to_string();
    assert!(matches!(SimEngine::from_config(&cfg, None), Err(SimError::UnknownScheme(_))));

    let mut cfg = SimConfig::default();
    cfg.companies[0].portfolio = vec![42];
    assert!(matches!(SimEngine::from_config(&cfg, None), Err(SimError::UnknownProduct(42))));

    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ \"scenario_name\": ").unwrap();
    assert!(matches!(SimConfig::from_file(&broken), Err(SimError::Json(_))));
}
