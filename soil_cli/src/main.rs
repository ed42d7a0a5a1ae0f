//! # SoilLab CLI
//!
//! Runs one calculation request through `soil_core`.
//!
//! ```text
//! soil_cli request.json       # read the request from a file
//! soil_cli < request.json     # or from stdin
//! soil_cli equations          # print the equation reference
//! ```
//!
//! The request is a tagged `CalculationItem`, e.g.
//! `{ "type": "Stress", "geometry": { ... }, "points": [ ... ] }`.
//! A short summary goes first, then the pretty JSON output.
//! Set `RUST_LOG=debug` to see intermediate values.

use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use soil_core::calculations::{
    AtterbergResult, CalculationItem, CalculationOutput, ClassificationResult, CompactionCurve, GeostaticProfile,
    GrainSizeResult, PhaseIndicesResult, SettlementResult, StressOutput,
};
use soil_core::equations::registry::generate_equations_markdown;
use soil_core::{load_item, CalcError, CalcResult};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("equations") {
        print!("{}", generate_equations_markdown());
        return ExitCode::SUCCESS;
    }

    match run(arg.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(path: Option<&str>) -> CalcResult<()> {
    let item = read_request(path)?;
    tracing::info!(calc_type = item.calc_type(), label = item.label(), "request loaded");

    let output = item.run()?;

    println!("═══════════════════════════════════════");
    println!("  {} {}", item.calc_type().to_uppercase(), item.label());
    println!("═══════════════════════════════════════");
    match &output {
        CalculationOutput::GrainSize(result) => print_grain_size(result),
        CalculationOutput::Atterberg(result) => print_atterberg(result),
        CalculationOutput::Compaction(curve) => print_compaction(curve),
        CalculationOutput::PhaseIndices(result) => print_phase_indices(result),
        CalculationOutput::Geostatic(profile) => print_geostatic(profile),
        CalculationOutput::Stress(out) => print_stress(out),
        CalculationOutput::Settlement(result) => print_settlement(result),
    }
    println!();

    println!("JSON Output:");
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_request(path: Option<&str>) -> CalcResult<CalculationItem> {
    match path {
        Some(p) => load_item(Path::new(p)),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CalcError::file_error("read", "<stdin>", e.to_string()))?;
            Ok(serde_json::from_str(&buf)?)
        }
    }
}

/// Four decimals, or a dash for a value that could not be determined
fn fmt4(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "-".to_string(),
    }
}

fn print_grain_size(result: &GrainSizeResult) {
    println!("Passing (%):");
    for point in &result.curve.points {
        println!(
            "  {:>8}  {:>9.4} mm  {:>8.4}",
            point.designation.as_deref().unwrap_or("-"),
            point.aperture_mm,
            point.percent_passing
        );
    }
    println!();
    println!("  D10 = {} mm   D30 = {} mm   D60 = {} mm", fmt4(result.d10), fmt4(result.d30), fmt4(result.d60));
    println!("  Cu  = {}   Cc = {}", fmt4(result.cu), fmt4(result.cc));
    println!(
        "  Gravel {:.4} %   Sand {:.4} %   Fines {:.4} %",
        result.gravel_pct, result.sand_pct, result.fines_pct
    );
    if let Some(classification) = &result.classification {
        print_classification(classification);
    }
}

fn print_classification(result: &ClassificationResult) {
    println!();
    println!("Classification:");
    println!(
        "  USCS: {} {}",
        result.uscs_code.as_deref().unwrap_or("-"),
        result.uscs_description.as_deref().unwrap_or("")
    );
    println!(
        "  HRB:  {} {}",
        result.hrb_code.as_deref().unwrap_or("-"),
        result.hrb_description.as_deref().unwrap_or("")
    );
    for error in &result.errors {
        println!("  [!] {}", error);
    }
}

fn print_atterberg(result: &AtterbergResult) {
    println!("  LL = {} %   PL = {} %", fmt4(result.liquid_limit), fmt4(result.plastic_limit));
    println!("  PI = {}   IC = {}", fmt4(result.plasticity_index), fmt4(result.consistency_index));
    if let Some(plasticity) = result.plasticity {
        println!("  Plasticity:  {}", plasticity.display_name());
    }
    if let Some(consistency) = result.consistency {
        println!("  Consistency: {}", consistency.display_name());
    }
}

fn print_compaction(curve: &CompactionCurve) {
    println!("  w (%)      γd (kN/m³)");
    for point in &curve.points {
        println!("  {:>8.4}   {:>10.4}", point.moisture_pct, point.dry_unit_weight.value());
    }
    println!();
    println!("  w_opt     = {} %", fmt4(curve.optimum_moisture_pct));
    println!("  γd,max    = {} kN/m³", fmt4(curve.max_dry_unit_weight));
    if let Some(error) = &curve.error {
        println!("  [!] {}", error);
    }
}

fn print_stress(out: &StressOutput) {
    println!("  Total load: {:.4} kN", out.total_load_kn.value());
    println!("         x         y         z     Δσv (kPa)");
    for evaluated in &out.points {
        let p = evaluated.point;
        let flag = if evaluated.result.singular { " *" } else { "" };
        println!(
            "  {:>8.4}  {:>8.4}  {:>8.4}  {:>12}{}",
            p.x,
            p.y,
            p.z,
            fmt4(evaluated.result.delta_sigma_v),
            flag
        );
        if let Some(error) = &evaluated.result.error {
            println!("    [!] {}", error);
        }
    }
}

fn print_phase_indices(result: &PhaseIndicesResult) {
    println!("  γ    = {} kN/m³   γd   = {} kN/m³", fmt4(result.unit_weight_kn_m3), fmt4(result.dry_unit_weight_kn_m3));
    println!(
        "  γsat = {} kN/m³   γsub = {} kN/m³",
        fmt4(result.saturated_unit_weight_kn_m3),
        fmt4(result.submerged_unit_weight_kn_m3)
    );
    println!("  Gs = {}   e = {}", fmt4(result.specific_gravity), fmt4(result.void_ratio));
    println!(
        "  w = {} %   n = {} %   S = {} %",
        fmt4(result.moisture_pct),
        fmt4(result.porosity_pct),
        fmt4(result.saturation_pct)
    );
    if let (Some(dr), Some(compactness)) = (result.relative_density_pct, result.compactness) {
        println!("  Dr = {:.4} % ({})", dr, compactness.display_name());
    }
    if !result.unresolved.is_empty() {
        println!("  Not determined: {}", result.unresolved.join(", "));
    }
    for warning in &result.warnings {
        println!("  [!] {}", warning);
    }
}

fn print_geostatic(profile: &GeostaticProfile) {
    println!("   z (m)     σv (kPa)     u (kPa)    σ'v (kPa)    σ'h (kPa)");
    for p in &profile.points {
        println!(
            "  {:>6.4}  {:>11.4}  {:>10.4}  {:>11.4}  {:>11.4}",
            p.depth_m, p.total_vertical_kpa, p.pore_pressure_kpa, p.effective_vertical_kpa, p.effective_horizontal_kpa
        );
    }
}

fn print_settlement(result: &SettlementResult) {
    println!("  State: {} (OCR = {:.4})", result.state.display_name(), result.overconsolidation_ratio);
    println!("  σ'f   = {:.4} kPa", result.final_effective_stress_kpa);
    println!("  εv    = {:.4}", result.volumetric_strain);
    println!("  ρ     = {:.4} m", result.settlement_m);
}
