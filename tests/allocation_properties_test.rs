use anyhow::Result;
use thynk_roi::adapters::scenario_link;
use thynk_roi::domain::model::{CoefficientField, Service, SharedResource};
use thynk_roi::domain::outcome::ModuleStatus;
use thynk_roi::domain::scenario::GlobalField;
use thynk_roi::{run_pass, Scenario, ScenarioEdit, TomlConfig};

fn coefficient(id: &str, field: CoefficientField, value: f64) -> ScenarioEdit {
    ScenarioEdit::Coefficient {
        id: id.to_string(),
        field,
        value: Some(value),
    }
}

/// 只啟用 pulm 與 prostate，兩者各向 ION 要求 80 單位，ION 池為 1 × 100
fn contended_scenario() -> Result<Scenario> {
    let mut edits: Vec<ScenarioEdit> = Scenario::default()
        .modules
        .iter()
        .filter(|m| m.id() != "pulm" && m.id() != "prostate")
        .map(|m| ScenarioEdit::ModuleEnabled {
            id: m.id().to_string(),
            enabled: false,
        })
        .collect();

    edits.push(ScenarioEdit::Global(GlobalField::IonCount, 1.0));
    edits.push(ScenarioEdit::Global(GlobalField::IonCapacity, 100.0));

    for id in ["pulm", "prostate"] {
        edits.extend([
            coefficient(id, CoefficientField::ExamVolumeOverride, 160.0),
            coefficient(id, CoefficientField::DetectionPct, 100.0),
            coefficient(id, CoefficientField::CaptureWithPlatformPct, 100.0),
            coefficient(id, CoefficientField::CaptureBaselinePct, 0.0),
            coefficient(id, CoefficientField::ConversionPct, 100.0),
            coefficient(id, CoefficientField::IonSharePct, 50.0),
            coefficient(id, CoefficientField::DaVinciSharePct, 0.0),
            coefficient(id, CoefficientField::Specialists, 10.0),
            coefficient(id, CoefficientField::CapacityPerSpecialist, 100.0),
        ]);
    }

    Ok(Scenario::default().apply_all(edits)?)
}

/// 用來掃過多種設定的小型網格
fn scenario_grid() -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    for annual_cts in [0.0, 25_000.0, 100_000.0, 400_000.0] {
        for (ion_count, da_vinci_count) in [(0.0, 0.0), (1.0, 1.0), (2.0, 3.0), (6.0, 8.0)] {
            for retained in [0.0, 75.0, 100.0] {
                scenarios.push(Scenario::default().apply_all([
                    ScenarioEdit::Global(GlobalField::AnnualCts, annual_cts),
                    ScenarioEdit::Global(GlobalField::MonthlyLcs, annual_cts / 400.0),
                    ScenarioEdit::Global(GlobalField::IonCount, ion_count),
                    ScenarioEdit::Global(GlobalField::DaVinciCount, da_vinci_count),
                    ScenarioEdit::Global(GlobalField::RetainedPct, retained),
                ])?);
            }
        }
    }
    Ok(scenarios)
}

#[test]
fn test_first_come_allocation_in_catalog_order() -> Result<()> {
    let scenario = contended_scenario()?;
    let output = run_pass(&scenario)?;

    let pulm = output.result("pulm").expect("pulm result");
    let prostate = output.result("prostate").expect("prostate result");

    assert_eq!(pulm.ion_units, 80.0);
    assert_eq!(pulm.status, ModuleStatus::Nominal);
    assert_eq!(prostate.ion_units, 20.0);
    assert_eq!(prostate.status, ModuleStatus::IonCapped);
    assert_eq!(output.ledger.ion_remaining, 0.0);
    Ok(())
}

#[test]
fn test_swapping_order_changes_which_module_is_capped() -> Result<()> {
    let mut scenario = contended_scenario()?;
    let pulm_index = scenario.modules.iter().position(|m| m.id() == "pulm").expect("pulm");
    let prostate_index = scenario
        .modules
        .iter()
        .position(|m| m.id() == "prostate")
        .expect("prostate");
    scenario.modules.swap(pulm_index, prostate_index);

    let output = run_pass(&scenario)?;
    assert_eq!(output.result("prostate").expect("prostate").ion_units, 80.0);
    assert_eq!(output.result("pulm").expect("pulm").ion_units, 20.0);
    assert_eq!(
        output.result("pulm").expect("pulm").status,
        ModuleStatus::IonCapped
    );
    Ok(())
}

#[test]
fn test_ledger_stays_within_bounds() -> Result<()> {
    for scenario in scenario_grid()? {
        let output = run_pass(&scenario)?;
        let ledger = output.ledger;

        assert_eq!(
            ledger.ion_initial,
            scenario.config.pool_capacity(SharedResource::Ion)
        );
        assert!(ledger.ion_remaining >= 0.0);
        assert!(ledger.ion_remaining <= ledger.ion_initial);
        assert!(ledger.da_vinci_remaining >= 0.0);
        assert!(ledger.da_vinci_remaining <= ledger.da_vinci_initial);

        let ion_drawn: f64 = output.results.iter().map(|r| r.ion_units).sum();
        assert!((ledger.ion_initial - ledger.ion_remaining - ion_drawn).abs() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_staffing_cap_is_never_exceeded() -> Result<()> {
    for scenario in scenario_grid()? {
        let scenario = scenario.apply_all([
            coefficient("renal", CoefficientField::Specialists, 1.0),
            coefficient("renal", CoefficientField::CapacityPerSpecialist, 5.0),
        ])?;
        let output = run_pass(&scenario)?;

        for (module, result) in scenario.modules.iter().zip(&output.results) {
            let ceiling = f64::from(module.coefficients.specialists)
                * module.coefficients.capacity_per_specialist;
            assert!(
                result.procedures <= ceiling + 1e-9,
                "{} exceeded staffing: {} > {}",
                module.id(),
                result.procedures,
                ceiling
            );
        }
        assert!(output.result("renal").expect("renal").procedures <= 5.0);
    }
    Ok(())
}

#[test]
fn test_disabled_modules_are_zero_and_do_not_draw() -> Result<()> {
    let scenario = Scenario::default();
    let baseline = run_pass(&scenario)?;

    // lcs 是第一個向 ION 取用的模組；停用後其餘模組可拿到更多
    let without_lcs = scenario.apply(ScenarioEdit::ModuleEnabled {
        id: "lcs".to_string(),
        enabled: false,
    })?;
    let output = run_pass(&without_lcs)?;

    let lcs = output.result("lcs").expect("lcs");
    assert_eq!(lcs.status, ModuleStatus::Off);
    assert!(lcs.delta.is_zero());
    assert_eq!(lcs.procedures, 0.0);
    assert_eq!(lcs.revenue_delta, 0.0);

    let others_before: f64 = baseline
        .results
        .iter()
        .filter(|r| r.id != "lcs")
        .map(|r| r.ion_units)
        .sum();
    let others_after: f64 = output
        .results
        .iter()
        .filter(|r| r.id != "lcs")
        .map(|r| r.ion_units)
        .sum();
    assert!(others_after >= others_before);
    Ok(())
}

#[test]
fn test_missing_service_scales_conversion_by_gate() -> Result<()> {
    // 單一模組、容量充足，避免資源上限干擾比例
    let isolate: Vec<ScenarioEdit> = Scenario::default()
        .modules
        .iter()
        .filter(|m| m.id() != "renal")
        .map(|m| ScenarioEdit::ModuleEnabled {
            id: m.id().to_string(),
            enabled: false,
        })
        .chain([
            ScenarioEdit::Global(GlobalField::DaVinciCount, 100.0),
            ScenarioEdit::Global(GlobalField::IonCount, 100.0),
        ])
        .collect();
    let covered = Scenario::default().apply_all(isolate)?;
    let uncovered = covered.apply(ScenarioEdit::Service {
        service: Service::Urology,
        available: false,
    })?;

    let full = run_pass(&covered)?;
    let gated = run_pass(&uncovered)?;
    let full = full.result("renal").expect("renal");
    let gated = gated.result("renal").expect("renal");

    assert_eq!(gated.clinic_visits, full.clinic_visits);
    assert!(gated.procedures < full.procedures);
    assert!((gated.procedures - full.procedures * 0.4).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_identical_inputs_give_identical_results() -> Result<()> {
    for scenario in scenario_grid()?.into_iter().step_by(5) {
        let first = run_pass(&scenario)?;
        let second = run_pass(&scenario.clone())?;
        assert_eq!(first, second);
    }
    Ok(())
}

#[test]
fn test_totals_equal_column_sums() -> Result<()> {
    for scenario in scenario_grid()? {
        let output = run_pass(&scenario)?;
        let sums = output.summary.column_sums();
        let totals = output.summary.totals;
        assert!((sums.revenue - totals.revenue).abs() < 1e-6);
        assert!((sums.procedures - totals.procedures).abs() < 1e-9);
        assert!((sums.ion_units - totals.ion_units).abs() < 1e-9);
    }

    let all_off = Scenario::default().apply_all(
        Scenario::default()
            .modules
            .iter()
            .map(|m| ScenarioEdit::ModuleEnabled {
                id: m.id().to_string(),
                enabled: false,
            })
            .collect::<Vec<_>>(),
    )?;
    let output = run_pass(&all_off)?;
    assert!(output.summary.totals.is_zero());
    assert_eq!(output.ledger.ion_remaining, output.ledger.ion_initial);
    Ok(())
}

#[test]
fn test_scenario_string_round_trip() -> Result<()> {
    let scenario = contended_scenario()?.apply_all([
        ScenarioEdit::Global(GlobalField::CommercialPct, 33.0),
        ScenarioEdit::Service {
            service: Service::GiOnc,
            available: false,
        },
    ])?;

    let token = scenario_link::encode(&scenario)?;
    let restored = scenario_link::decode(&token, &Scenario::default())?;

    assert_eq!(restored.config, scenario.config);
    assert_eq!(restored.modules, scenario.modules);
    assert_eq!(run_pass(&restored)?, run_pass(&scenario)?);
    Ok(())
}

#[test]
fn test_no_specialists_means_no_procedures_even_with_unbounded_capacity() -> Result<()> {
    let file = TomlConfig::from_toml_str(
        r#"
[[modules]]
id = "renal"
specialists = 0
capacity_per_specialist = inf
"#,
    )?;
    let scenario = file.into_scenario()?;
    let renal = scenario.module("renal").expect("renal");
    assert_eq!(renal.coefficients.specialists, 0);
    assert!(renal.coefficients.capacity_per_specialist.is_infinite());

    let output = run_pass(&scenario)?;
    let result = output.result("renal").expect("renal");
    assert_eq!(result.procedures, 0.0);
    assert_eq!(result.da_vinci_units, 0.0);
    assert_eq!(result.ion_units, 0.0);

    // 不佔用共用資源：後續模組拿到的與停用 renal 時相同
    let without_renal = run_pass(&scenario.apply(ScenarioEdit::ModuleEnabled {
        id: "renal".to_string(),
        enabled: false,
    })?)?;
    assert_eq!(output.ledger, without_renal.ledger);
    Ok(())
}
