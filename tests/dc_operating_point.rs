//! End-to-end operating-point tests: netlist text in, voltages and device
//! report out.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use dcpoint_core::circuit::{Circuit, DeviceId, NodeId};
use dcpoint_core::components::{Mosfet, MosfetModel, Polarity, Region};
use dcpoint_core::netlist;
use dcpoint_core::report::{compute_currents_and_powers, DeviceReport};
use dcpoint_core::solver::{
    solve_dc, CurrentStampPolarity, DcAnalysis, DcConfig, DcSolution, SolveMode,
};
use dcpoint_core::DcError;

fn solve(text: &str) -> (Circuit, DcSolution, DeviceReport) {
    let circuit = netlist::parse(text).unwrap();
    let solution = solve_dc(&circuit).unwrap();
    let report = compute_currents_and_powers(&circuit, &solution.voltages, &solution.currents);
    (circuit, solution, report)
}

fn volts(circuit: &Circuit, solution: &DcSolution, name: &str) -> f64 {
    solution.voltages.by_name(circuit, name).unwrap()
}

const COMMON_SOURCE: &str = "\
* NMOS common-source stage
.MODEL NCH NMOS VT 1 MU 1 COX 1e-3
VDD vdd GND 5
RD  vdd d   1k
VG  g   GND 2
M1  d   g   GND NCH 1u 1u
.PLOTNV d
";

#[test]
fn ground_is_index_zero_wherever_it_appears() {
    let circuit = netlist::parse("R1 a b 1k\nR2 b c 1k\nV1 c GND 1\nR3 a 0 1k").unwrap();
    assert_eq!(circuit.find_node("GND"), Some(NodeId::GROUND));
    assert_eq!(circuit.find_node("0"), Some(NodeId::GROUND));
    assert_eq!(circuit.nodes()[0].name, "GND");
    assert_eq!(circuit.find_node("a"), Some(NodeId(1)));
    assert_eq!(circuit.find_node("b"), Some(NodeId(2)));
    assert_eq!(circuit.find_node("c"), Some(NodeId(3)));
}

#[test]
fn source_across_resistor() {
    let (circuit, solution, report) = solve("V1 A GND 5\nR1 A GND 1k");
    assert_relative_eq!(volts(&circuit, &solution, "A"), 5.0, epsilon = 1e-12);

    let v1 = report.get("V1").unwrap();
    assert_relative_eq!(v1.current, 5e-3, epsilon = 1e-15);
    let branch = circuit.device("V1").and_then(|d| d.branch()).unwrap();
    assert_relative_eq!(solution.branch_current(branch), 5e-3, epsilon = 1e-15);
}

#[test]
fn resistor_power_is_voltage_squared_over_r() {
    let (circuit, solution, report) = solve("V1 a GND 12\nR1 a b 2k\nR2 b GND 1k");
    let va = volts(&circuit, &solution, "a");
    let vb = volts(&circuit, &solution, "b");
    assert_relative_eq!(vb, 4.0, epsilon = 1e-9);

    let r1 = report.get("R1").unwrap();
    assert_relative_eq!(r1.power, (va - vb).powi(2) / 2e3, epsilon = 1e-12);
}

#[test]
fn floating_node_is_singular() {
    let circuit = netlist::parse("V1 a GND 1\nR1 a GND 1k\nR2 x y 1k").unwrap();
    let err = solve_dc(&circuit).unwrap_err();
    assert!(matches!(err, DcError::SingularMatrix { .. }));
    assert!(err.is_fatal());
}

#[test]
fn stub_node_on_one_resistor_is_singular() {
    let circuit = netlist::parse("V1 a GND 1\nR1 a GND 1k\nR2 a x 1k").unwrap();
    let x = circuit.find_node("x").unwrap();
    match solve_dc(&circuit) {
        Err(DcError::SingularMatrix { pivot }) => assert_eq!(pivot, x.0),
        other => panic!("expected singular matrix, got {:?}", other),
    }
}

#[test]
fn widely_scaled_network_solves() {
    let (circuit, solution, _) = solve("V1 a GND 1\nR1 a GND 1m\nR2 a b 10G\nR3 b GND 10G");
    assert_relative_eq!(volts(&circuit, &solution, "a"), 1.0, epsilon = 1e-12);
    assert_relative_eq!(volts(&circuit, &solution, "b"), 0.5, epsilon = 1e-9);
}

#[test]
fn node_behind_inductor_is_singular() {
    let circuit = netlist::parse("V1 a GND 1\nR1 a GND 1k\nL1 a b 1m").unwrap();
    assert!(matches!(solve_dc(&circuit), Err(DcError::SingularMatrix { .. })));

    // Two inductor legs still leave b without a DC path
    let circuit = netlist::parse("V1 a GND 1\nR1 a GND 1k\nL1 a b 1m\nL2 b GND 1m").unwrap();
    assert!(matches!(solve_dc(&circuit), Err(DcError::SingularMatrix { .. })));
}

#[test]
fn inductor_reports_no_current_or_power() {
    let (circuit, solution, report) = solve("V1 a GND 2\nR1 a b 1k\nR2 b GND 1k\nL1 a b 1m");
    // Open at DC: the divider is undisturbed
    assert_relative_eq!(volts(&circuit, &solution, "b"), 1.0, epsilon = 1e-12);

    let l1 = report.get("L1").unwrap();
    assert_eq!(l1.current, 0.0);
    assert_eq!(l1.power, 0.0);
    assert_relative_eq!(report.total_delivered(), report.total_absorbed(), epsilon = 1e-12);
}

#[test]
fn node_behind_capacitor_is_singular() {
    let circuit = netlist::parse("V1 a GND 1\nR1 a GND 1k\nC1 a b 1u").unwrap();
    assert!(matches!(solve_dc(&circuit), Err(DcError::SingularMatrix { .. })));
}

#[test]
fn parallel_voltage_sources_are_singular() {
    let circuit = netlist::parse("V1 a GND 1\nV2 a GND 2\nR1 a GND 1k").unwrap();
    assert!(matches!(solve_dc(&circuit), Err(DcError::SingularMatrix { .. })));
}

#[test]
fn mirrored_nmos_and_pmos_flip_stamped_gm() {
    let model = MosfetModel::new("MOD", Polarity::Nmos)
        .with_param("VT", 0.0)
        .with_param("MU", 1.0)
        .with_param("COX", 1e-3)
        .with_param("LAMBDA", 0.05);
    let device = |polarity| {
        Mosfet::new(
            DeviceId(0),
            "M1".to_string(),
            [NodeId(1), NodeId(2), NodeId(3)],
            "MOD".to_string(),
            2e-6,
            1e-6,
            polarity,
        )
        .unwrap()
    };

    // NMOS: VGS = 2, VDS = 3. PMOS at the same terminals: VGS = -2, VDS = -3.
    let n = device(Polarity::Nmos).evaluate(&model, 3.0, 2.0, 0.0);
    let p = device(Polarity::Pmos).evaluate(&model, 3.0, 2.0, 0.0);

    assert_eq!(n.region, Region::Saturation);
    assert_eq!(p.region, Region::Saturation);
    assert_relative_eq!(n.vgs, -p.vgs);
    assert_relative_eq!(n.vds, -p.vds);
    assert_relative_eq!(n.stamp_gm(), -p.stamp_gm(), epsilon = 1e-15);
    assert_relative_eq!(n.gds, p.gds, epsilon = 1e-15);
    assert!(n.gds > 0.0);
}

#[test]
fn parse_is_deterministic() {
    let text = format!("{}E1 x GND d GND 2\nRX x GND 1k\n.ALIAS out d", COMMON_SOURCE);
    let a = netlist::parse(&text).unwrap();
    let b = netlist::parse(&text).unwrap();
    assert_eq!(a.nodes(), b.nodes());
    assert_eq!(a.devices(), b.devices());
    assert!(a.models().eq(b.models()));
    assert_eq!(a.plot_nodes(), b.plot_nodes());
}

#[test]
fn omitted_model_keys_are_zero() {
    let circuit = netlist::parse(".MODEL M1 VT 0.5").unwrap();
    let model = circuit.model("M1").unwrap();
    assert_eq!(model.vt, 0.5);
    assert_eq!(model.mu, 0.0);
    assert_eq!(model.cox, 0.0);
    assert_eq!(model.lambda, 0.0);
    assert_eq!(model.cj0, 0.0);
    assert_eq!(model.polarity, Polarity::Nmos);
}

#[test]
fn kcl_holds_at_every_node() {
    let text = "\
V1 in GND 9
R1 in a 1k
R2 a GND 2k
R3 a b 3k
R4 b GND 4k
R5 in b 5k
";
    let (circuit, solution, report) = solve(text);

    for node in circuit.nodes().iter().filter(|n| !n.index.is_ground()) {
        let mut inflow = 0.0;
        for (device, entry) in circuit.devices().iter().zip(report.iter()) {
            let nodes = device.nodes();
            let (pos, neg) = (nodes[0], nodes[1]);
            // Resistor currents run pos -> neg; the source delivers out of pos
            let into_pos = if entry.is_source() { entry.current } else { -entry.current };
            if pos == node.index {
                inflow += into_pos;
            }
            if neg == node.index {
                inflow -= into_pos;
            }
        }
        assert_abs_diff_eq!(inflow, 0.0, epsilon = 1e-12);
    }
    assert!(solution.converged);
}

#[test]
fn energy_balance_in_resistive_network() {
    let text = "\
V1 a GND 10
V2 c GND 3
R1 a b 1k
R2 b c 2k
R3 b GND 3k
I1 GND b 1m
";
    let circuit = netlist::parse(text).unwrap();
    let config = DcConfig::new().with_current_polarity(CurrentStampPolarity::Conventional);
    let solution = DcAnalysis::with_config(&circuit, config).solve().unwrap();
    let report = compute_currents_and_powers(&circuit, &solution.voltages, &solution.currents);

    assert_relative_eq!(
        report.total_delivered(),
        report.total_absorbed(),
        epsilon = 1e-12
    );
}

#[test]
fn current_source_polarity_options() {
    let circuit = netlist::parse("I1 a GND 1m\nR1 a GND 1k").unwrap();
    let a = circuit.find_node("a").unwrap();

    let additive = solve_dc(&circuit).unwrap();
    assert_relative_eq!(additive.voltage(a), 1.0, epsilon = 1e-12);

    let config = DcConfig::new().with_current_polarity(CurrentStampPolarity::Conventional);
    let conventional = DcAnalysis::with_config(&circuit, config).solve().unwrap();
    assert_relative_eq!(conventional.voltage(a), -1.0, epsilon = 1e-12);
}

#[test]
fn alias_merges_spellings_into_one_node() {
    let (circuit, solution, _) = solve("V1 top GND 6\nR1 top mid 1k\nR2 middle GND 1k\n.ALIAS mid middle");
    assert_eq!(circuit.num_nodes(), 3);
    assert_relative_eq!(volts(&circuit, &solution, "middle"), 3.0, epsilon = 1e-12);
    assert_relative_eq!(volts(&circuit, &solution, "mid"), 3.0, epsilon = 1e-12);
}

#[test]
fn voltage_controlled_sources() {
    let (circuit, solution, report) = solve(
        "VIN in GND 0.5\nRIN in GND 1k\nE1 e GND in GND 10\nRE e GND 1k\nG1 g GND in GND 4m\nRG g GND 1k",
    );
    assert_relative_eq!(volts(&circuit, &solution, "e"), 5.0, epsilon = 1e-12);
    assert_relative_eq!(report.get("E1").unwrap().current, 5e-3, epsilon = 1e-15);

    // 2 mA flows out of g through G1 to ground
    assert_relative_eq!(volts(&circuit, &solution, "g"), -2.0, epsilon = 1e-12);
    assert_relative_eq!(report.get("G1").unwrap().current, 2e-3, epsilon = 1e-15);
    assert_relative_eq!(report.total_delivered(), report.total_absorbed(), epsilon = 1e-12);
}

#[test]
fn current_controlled_sources() {
    // VS delivers 1 mA, so its MNA branch current is -1 mA
    let (circuit, solution, report) =
        solve("F1 f GND VS 2\nRF f GND 1k\nH1 h GND VS 1k\nRH h GND 1k\nVS a GND 1\nRA a GND 1k");
    assert_relative_eq!(volts(&circuit, &solution, "f"), 2.0, epsilon = 1e-12);
    assert_relative_eq!(volts(&circuit, &solution, "h"), -1.0, epsilon = 1e-12);
    assert_relative_eq!(report.total_delivered(), report.total_absorbed(), epsilon = 1e-12);
}

#[test]
fn mosfet_fixed_point_converges() {
    let (circuit, solution, report) = solve(COMMON_SOURCE);
    assert!(solution.converged);
    assert_eq!(solution.iterations, 3);
    assert_relative_eq!(volts(&circuit, &solution, "d"), 3.0, epsilon = 1e-9);

    let m1 = report.get("M1").unwrap();
    let op = m1.mosfet.unwrap();
    assert_eq!(op.region, Region::Saturation);
    assert_relative_eq!(op.drain_current, 2e-3, epsilon = 1e-12);
    assert_relative_eq!(report.total_delivered(), report.total_absorbed(), epsilon = 1e-12);
}

#[test]
fn iteration_cap_reports_convergence_failure() {
    let circuit = netlist::parse(COMMON_SOURCE).unwrap();
    let config = DcConfig::new().with_max_iterations(1);
    let err = DcAnalysis::with_config(&circuit, config).solve().unwrap_err();
    assert!(matches!(err, DcError::ConvergenceFailure { iterations: 1, .. }));
}

#[test]
fn single_pass_leaves_mosfets_off() {
    let circuit = netlist::parse(COMMON_SOURCE).unwrap();
    let config = DcConfig::new().with_mode(SolveMode::SinglePass);
    let solution = DcAnalysis::with_config(&circuit, config).solve().unwrap();
    assert!(!solution.converged);
    assert_eq!(solution.iterations, 1);
    assert_relative_eq!(volts(&circuit, &solution, "d"), 5.0, epsilon = 1e-12);
}

#[test]
fn grounded_gate_stays_off() {
    let (circuit, solution, report) =
        solve(".MODEL NCH VT 1 MU 1 COX 1e-3\nVDD vdd GND 5\nRD vdd d 1k\nM1 d GND GND NCH 1u 1u");
    assert_eq!(solution.iterations, 2);
    assert_relative_eq!(volts(&circuit, &solution, "d"), 5.0, epsilon = 1e-12);
    assert_eq!(report.get("M1").unwrap().mosfet.unwrap().region, Region::Off);
}

#[test]
fn diagnostics_do_not_stop_the_run() {
    let text = "\
Q1 c b e NPN
R1 a GND 1x2
V1 a GND 2
R2 a GND 1k
M1 a a GND MISSING 1u 1u
.hb 1k 10m
";
    let (circuit, solution, _) = solve(text);
    assert_relative_eq!(volts(&circuit, &solution, "a"), 2.0, epsilon = 1e-12);

    let diags = circuit.diagnostics();
    assert!(diags.iter().any(|d| matches!(d, DcError::UnknownElement { line: 1, .. })));
    assert!(diags.iter().any(|d| matches!(d, DcError::ParseError { line: 2, .. })));
    assert!(diags.iter().any(|d| matches!(d, DcError::UnknownModel { .. })));
    assert_eq!(circuit.analyses().len(), 1);
}

#[test]
fn missing_file_is_fatal() {
    let err = netlist::parse_file("does/not/exist.cir").unwrap_err();
    assert!(matches!(err, DcError::FileNotFound { .. }));
}
